use std::{fs, path::Path, process::Command};

fn main() {
    println!("cargo::rerun-if-changed=shaders/");

    compile_shader("TexturedShader", "vs");
    compile_shader("TexturedShader", "ps");
}

/// Compiles `shaders/<name>.<stage>.hlsl` into `cso/` next to the executables.
fn compile_shader(name: &str, stage: &str) {
    if std::env::var_os("CARGO_CFG_WINDOWS").is_none() {
        return;
    }

    let out_dir = std::env::var("OUT_DIR").unwrap() + "/../../../cso/";
    create_dir(Path::new(&out_dir));

    let src = format!("shaders/{name}.{stage}.hlsl");
    let dst = format!("{out_dir}{name}.{stage}.cso");
    let profile = format!("{stage}_5_0");

    let status = Command::new("fxc")
        .args(["/nologo", "/T", &profile, "/E", "main", "/Fo", &dst, &src])
        .status();
    match status {
        Ok(status) if status.success() => println!("Compiled {src} to {dst}"),
        Ok(status) => println!("cargo::warning=fxc failed on {src}: {status}"),
        Err(e) => println!("cargo::warning=Could not run fxc on {src}: {e}"),
    }
}

fn create_dir(dir: &Path) {
    if !dir.exists() {
        if let Err(e) = fs::create_dir_all(dir) {
            println!("Failed to create {}: {e}", dir.display());
        }
    }
}
