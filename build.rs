use chrono::Utc;

fn main() {
    let version = std::env::var("BUILD_VERSION")
        .unwrap_or_else(|_| Utc::now().format("%Y.%m.%d-%H%M").to_string());
    println!("cargo:rustc-env=BUILD_VERSION={version}");
    println!("cargo:rerun-if-env-changed=BUILD_VERSION");
}
