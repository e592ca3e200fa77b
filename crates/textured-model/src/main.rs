use std::process::ExitCode;

use textured_model::UVTexturedDemo;

fn main() -> ExitCode {
    common::framework::launch(UVTexturedDemo::new)
}
