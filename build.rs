fn main() {
    println!("cargo:rerun-if-env-changed=ROOMCTL_CONFIG_JSON");

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
