use std::process::ExitCode;

use material_only::DrawingMaterialOnlyApp;

fn main() -> ExitCode {
    common::framework::launch(DrawingMaterialOnlyApp::new)
}
