use std::env;

/// Longest device name that fits the `BLE_DEVICE_NAME` setting
const MAX_DEVICE_NAME_LEN: usize = 16;

fn main() {
    // Build-time default for the advertised BLE name. Only used when the
    // setting has never been written to storage.
    let name = env::var("NVCONFIG_BLE_DEVICE_NAME").unwrap_or_else(|_| "nvconfig".to_string());

    if name.is_empty() || name.contains('\0') {
        panic!("NVCONFIG_BLE_DEVICE_NAME must be non-empty and free of NUL bytes");
    }

    if name.len() > MAX_DEVICE_NAME_LEN {
        println!(
            "cargo:warning=NVCONFIG_BLE_DEVICE_NAME is {} bytes, truncating to {}",
            name.len(),
            MAX_DEVICE_NAME_LEN
        );
    } else if env::var("NVCONFIG_BLE_DEVICE_NAME").is_ok() {
        println!("cargo:warning=Using NVCONFIG_BLE_DEVICE_NAME from environment: {}", name);
    }

    let mut end = name.len().min(MAX_DEVICE_NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    println!("cargo:rustc-env=NVCONFIG_BLE_DEVICE_NAME={}", &name[..end]);

    // Watchdog timeout default in milliseconds
    let wdt = env::var("NVCONFIG_WDT_TIMEOUT_MS").unwrap_or_else(|_| "5000".to_string());
    let wdt_ms = match wdt.trim().parse::<u32>() {
        Ok(v) if v > 0 => v,
        _ => panic!("NVCONFIG_WDT_TIMEOUT_MS must be a non-zero u32, got '{}'", wdt),
    };
    // Normalized digits only
    println!("cargo:rustc-env=NVCONFIG_WDT_TIMEOUT_MS={}", wdt_ms);

    println!("cargo:rerun-if-env-changed=NVCONFIG_BLE_DEVICE_NAME");
    println!("cargo:rerun-if-env-changed=NVCONFIG_WDT_TIMEOUT_MS");
}
