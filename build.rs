fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_build::configure()
        // Server codegen is only used by the in-process test fixtures.
        .build_server(true)
        .compile_protos(
            &[
                "proto/gnmi_ext.proto",
                "proto/gnmi.proto",
                "proto/gnmireverse.proto",
            ],
            &["proto/", "/usr/include"],
        )?;
    Ok(())
}
