//! HTTP boundary: program upload and the config script.
//!
//! [`routes`] is pure (URI in, [`routes::HttpReply`] out) and runs under
//! host tests; [`server`] binds it to `EspHttpServer` on the device.

pub mod routes;
pub mod server;
