use tonic_build::manual::{Builder, Method, Service};

const PROST_CODEC: &str = "tonic_prost::ProstCodec";

fn main() {
    let command_service = Service::builder()
        .name("CommandService")
        .package("io.axoniq.axonserver.grpc.command")
        .method(
            Method::builder()
                .name("open_stream")
                .route_name("OpenStream")
                .input_type("crate::proto::CommandProviderOutbound")
                .output_type("crate::proto::CommandProviderInbound")
                .codec_path(PROST_CODEC)
                .client_streaming()
                .server_streaming()
                .build(),
        )
        .method(
            Method::builder()
                .name("dispatch")
                .route_name("Dispatch")
                .input_type("crate::proto::Command")
                .output_type("crate::proto::CommandResponse")
                .codec_path(PROST_CODEC)
                .build(),
        )
        .build();

    let platform_service = Service::builder()
        .name("PlatformService")
        .package("io.axoniq.axonserver.grpc.control")
        .method(
            Method::builder()
                .name("get_platform_server")
                .route_name("GetPlatformServer")
                .input_type("crate::proto::ClientIdentification")
                .output_type("crate::proto::PlatformInfo")
                .codec_path(PROST_CODEC)
                .build(),
        )
        .build();

    Builder::new().compile(&[command_service, platform_service]);
}
