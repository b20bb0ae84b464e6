fn main() {
    // defmt 和 esp-hal 的链接脚本
    println!("cargo:rustc-link-arg=-Tdefmt.x");
    println!("cargo:rustc-link-arg=-Tlinkall.x");

    // 构建时配置，改动后需要重新编译
    for key in [
        "ALARM_HOUR",
        "ALARM_MINUTE",
        "ALARM_ENABLED",
        "HOUR_FORMAT",
        "SNOOZE_MINUTES",
        "TZ_OFFSET",
        "RTC_I2C_ADDR",
        "WIFI_SSID",
        "WIFI_PASSWORD",
        "NTP_SERVER",
    ] {
        println!("cargo:rerun-if-env-changed={key}");
    }
}
