// Build facts reported by `comspy version --extended`.
fn main() {
    for (var, exported) in [
        ("TARGET", "COMSPY_BUILD_TARGET"),
        ("PROFILE", "COMSPY_BUILD_PROFILE"),
    ] {
        if let Ok(value) = std::env::var(var) {
            println!("cargo:rustc-env={exported}={value}");
        }
        println!("cargo:rerun-if-env-changed={var}");
    }
}
