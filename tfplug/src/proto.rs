//! Protocol buffer types for Terraform Plugin Protocol v6
//!
//! Generated at build time by tonic-build from `proto/tfplugin6.proto` and
//! `proto/grpc_controller.proto`.
//!
//! Several protobuf messages share names with framework types
//! (`DynamicValue`, `Diagnostic`, `Schema`, `AttributePath`). Always refer to
//! the wire types through the `proto::` prefix.

include!(concat!(env!("OUT_DIR"), "/tfplugin6.rs"));

/// go-plugin's controller service.
pub mod plugin {
    include!(concat!(env!("OUT_DIR"), "/plugin.rs"));
}

pub use plugin::grpc_controller_server::{GrpcController, GrpcControllerServer};
pub use provider_server::{Provider as ProtoProvider, ProviderServer};
