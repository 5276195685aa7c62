use std::env;
use std::path::{Path, PathBuf};

/// Builds the stand-in compiler libraries exercised by the native backend
/// tests. A missing C toolchain only skips those tests.
fn main() {
    let source = Path::new("fixtures/fake_compiler.c");
    println!("cargo:rerun-if-changed={}", source.display());

    if env::var("CARGO_CFG_TARGET_FAMILY").as_deref() != Ok("unix") {
        return;
    }

    let Some(out_dir) = env::var_os("OUT_DIR").map(PathBuf::from) else {
        return;
    };

    let compiler = match cc::Build::new().try_get_compiler() {
        Ok(compiler) => compiler,
        Err(e) => {
            println!("cargo:warning=no C compiler for test fixtures: {}", e);
            return;
        }
    };

    let fixtures: [(&str, &str, &[&str]); 2] = [
        ("GGCODE_FIXTURE_LIBRARY", "libggcode_fixture.so", &[]),
        (
            "GGCODE_FIXTURE_LIBRARY_NO_ENTRY",
            "libggcode_fixture_no_entry.so",
            &["-DOMIT_ENTRY_POINT"],
        ),
    ];

    for (var, file, defines) in fixtures {
        let output = out_dir.join(file);
        let status = compiler
            .to_command()
            .args(["-shared", "-fPIC"])
            .args(defines)
            .arg(source)
            .arg("-o")
            .arg(&output)
            .status();

        match status {
            Ok(status) if status.success() => {
                println!("cargo:rustc-env={}={}", var, output.display());
            }
            Ok(status) => {
                println!("cargo:warning=building {} failed: {}", file, status);
            }
            Err(e) => {
                println!("cargo:warning=building {} failed: {}", file, e);
            }
        }
    }
}
