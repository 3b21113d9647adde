// HTTP API and server-rendered pages
pub mod http;
