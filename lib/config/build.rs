use serde::Deserialize;
use std::{env, fs, path::PathBuf};

#[derive(Deserialize)]
struct DriverSection {
    name: String,
    high_register: String,
    log_level: String,
}

#[derive(Deserialize)]
struct IdEntry {
    name: String,
    sysfs: bool,
}

#[derive(Deserialize)]
struct CpldConfig {
    driver: DriverSection,
    ids: Vec<IdEntry>,
    address_list: Vec<String>,
}

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let config_path = PathBuf::from(manifest_dir).join("../../cpld.json");
    let config_str = fs::read_to_string(&config_path)
        .unwrap_or_else(|err| panic!("Cannot read {}: {}", config_path.display(), err));
    let config: CpldConfig = serde_json::from_str(&config_str)
        .unwrap_or_else(|err| panic!("Malformed cpld.json: {}", err));
    make_flags(&config);
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=../../cpld.json");
}

fn parse_num(value: &str) -> u32 {
    let value = value.trim();
    let res = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => value.parse::<u32>(),
    };
    res.unwrap_or_else(|err| panic!("Bad number '{}' in cpld.json: {}", value, err))
}

fn make_flags(config: &CpldConfig) {
    let high_register = parse_num(&config.driver.high_register);
    assert!(high_register <= 0xff, "high_register must fit in a byte");
    match config.driver.log_level.as_str() {
        "Off" | "Error" | "Warn" | "Info" | "Debug" | "Trace" => {}
        other => panic!("Unknown log level '{}'", other),
    }

    let mut s: String = String::from("");
    s += &format!("pub const DRIVER_NAME: &str = {:?};\n", config.driver.name);
    s += &format!("pub const HIGH_REGISTER: u8 = {:#04x};\n", high_register);
    s += &format!("pub const LOG_LEVEL: &str = {:?};\n", config.driver.log_level);

    s += "pub const DEVICE_IDS: &[DeviceIdConfig] = &[\n";
    for id in &config.ids {
        assert!(id.name.len() < 20, "device id '{}' is too long", id.name);
        s += &format!(
            "    DeviceIdConfig {{ name: {:?}, sysfs: {} }},\n",
            id.name, id.sysfs
        );
    }
    s += "];\n";

    s += "pub const ADDRESS_LIST: &[u16] = &[";
    for addr in &config.address_list {
        let addr = parse_num(addr);
        assert!(addr <= 0x7f, "address {:#x} is not a 7-bit address", addr);
        s += &format!("{:#04x}, ", addr);
    }
    s += "];\n";

    let out_dir = env::var("OUT_DIR").unwrap();
    let path = PathBuf::from(out_dir).join("build_flags.rs");
    fs::write(path, s).unwrap();
}
