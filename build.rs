fn main() {
    // Build-time configuration surface, captured by `option_env!` in
    // `config.rs`. Changing any of these must rebuild the firmware.
    for var in [
        "GREENHOUSE_CONFIG",
        "GREENHOUSE_WIFI_SSID",
        "GREENHOUSE_WIFI_PASSWORD",
        "GREENHOUSE_WIFI_STA_AUTO",
    ] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
