pub mod client;
pub mod credentials;
pub mod serialization;
pub mod transmission;

pub use client::{ClientConfig, build_client};
pub use credentials::ShipperCredentials;
pub use serialization::{parse_envelope, serialize_envelope};
pub use transmission::{DeliveryResult, LogShipper, Rejection, build_headers};
