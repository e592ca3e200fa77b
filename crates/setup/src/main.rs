use std::process::ExitCode;

use setup::SetupApp;

fn main() -> ExitCode {
    common::framework::launch(SetupApp::new)
}
