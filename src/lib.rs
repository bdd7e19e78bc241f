// hookrelay - a minimal webhook broker
//
// Clients register callback URLs against event labels; a trigger fans the
// payload out to every callback with an HMAC-SHA256 signature attached.

// Re-export the webhook core
pub use hookrelay_webhooks::*;

// Re-export the HTTP surface
pub use hookrelay_server as server;
