//! Parsers for the text formats the `adb` binary and device shell emit.
//!
//! These are all ad hoc: each command has its own output shape and none of
//! them is versioned, so the parsers stay permissive and fall back to empty
//! values instead of failing.

use regex::Regex;

use super::types::{Device, DeviceMemory, StorageInfo};

/// Extracts one property value from a `getprop` dump of `[key]: [value]`
/// lines. An absent property yields an empty string.
pub fn property(props: &str, name: &str) -> String {
    let pattern = format!(r"\[{}\]:\s*\[(.+?)\]", regex::escape(name));
    let re = Regex::new(&pattern).expect("escaped property pattern is valid");
    re.captures(props)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}

/// Parses `MemTotal`/`MemFree` out of `/proc/meminfo` text. Missing fields
/// read as zero, matching the permissive fallback used everywhere else.
pub fn meminfo(raw: &str) -> DeviceMemory {
    let total_memory = meminfo_field(raw, "MemTotal");
    let mem_free = meminfo_field(raw, "MemFree");
    DeviceMemory {
        total_memory,
        mem_free,
        mem_used: total_memory.saturating_sub(mem_free),
    }
}

fn meminfo_field(raw: &str, name: &str) -> u64 {
    let re = Regex::new(&format!(r"{name}:\s+(\d+)\s+kB")).expect("meminfo pattern is valid");
    re.captures(raw)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Parses a `df` table: header line skipped, rows whitespace-split into
/// filesystem / blocks / used / available / use% / mount point. Rows with
/// fewer columns are dropped.
pub fn df(raw: &str) -> Vec<StorageInfo> {
    raw.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            Some(StorageInfo {
                path: cols.next()?.to_string(),
                k_blocks: cols.next()?.to_string(),
                used: cols.next()?.parse().unwrap_or(0),
                available: cols.next()?.parse().unwrap_or(0),
                use_percentage: cols.next()?.to_string(),
                mounted_on: cols.next()?.to_string(),
            })
        })
        .collect()
}

/// Parses `adb devices` output: header line skipped, each remaining row is
/// tab-separated serial / state / description columns. All listed devices
/// are kept regardless of state; filtering by state is the caller's call.
pub fn devices(raw: &str) -> Vec<Device> {
    raw.lines()
        .skip(1)
        .filter(|line| line.trim().len() > 2)
        .filter_map(|line| {
            let mut fields = line.split('\t').filter(|f| !f.is_empty());
            let serial = fields.next()?.trim().to_string();
            let _state = fields.next();
            let description = fields.collect::<Vec<_>>().join(" ");
            Some(Device {
                serial,
                description,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_present() {
        let dump = "[ro.product.name]: [walleye]\n[ro.product.model]: [Pixel]\n";
        assert_eq!(property(dump, "ro.product.model"), "Pixel");
    }

    #[test]
    fn property_absent_is_empty() {
        let dump = "[ro.product.model]: [Pixel]\n";
        assert_eq!(property(dump, "ro.build.version.sdk"), "");
    }

    #[test]
    fn property_name_is_escaped_literally() {
        // "ro.product.model" must not match "ro?product?model"-style lines.
        let dump = "[roXproductXmodel]: [Bogus]\n";
        assert_eq!(property(dump, "ro.product.model"), "");
    }

    #[test]
    fn meminfo_basic() {
        let raw = "MemTotal:        2048000 kB\nMemFree:          512000 kB\nCached:           100000 kB\n";
        assert_eq!(
            meminfo(raw),
            DeviceMemory {
                total_memory: 2048000,
                mem_free: 512000,
                mem_used: 1536000,
            }
        );
    }

    #[test]
    fn meminfo_missing_fields_read_zero() {
        let mem = meminfo("nothing useful here\n");
        assert_eq!(mem.total_memory, 0);
        assert_eq!(mem.mem_free, 0);
        assert_eq!(mem.mem_used, 0);
    }

    #[test]
    fn df_single_row() {
        let raw = "Filesystem 1K-blocks Used Available Use% Mounted on\n/dev/x 100 40 60 40% /data\n";
        let rows = df(raw);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            StorageInfo {
                path: "/dev/x".to_string(),
                k_blocks: "100".to_string(),
                used: 40,
                available: 60,
                use_percentage: "40%".to_string(),
                mounted_on: "/data".to_string(),
            }
        );
    }

    #[test]
    fn df_skips_short_rows() {
        let raw = "Filesystem 1K-blocks Used Available Use% Mounted on\n/dev/x 100 40 60 40% /data\ntruncated row\n";
        assert_eq!(df(raw).len(), 1);
    }

    #[test]
    fn devices_basic() {
        let raw = "List of devices attached\nemulator-5554\tdevice\nabc123\tunauthorized\n";
        let devs = devices(raw);
        assert_eq!(devs.len(), 2);
        assert_eq!(devs[0].serial, "emulator-5554");
        assert_eq!(devs[1].serial, "abc123");
    }

    #[test]
    fn devices_keeps_description_columns() {
        let raw = "List of devices attached\n1d36d8f1\tdevice\tproduct:OnePlus6\tmodel:ONEPLUS_A6000\n";
        let devs = devices(raw);
        assert_eq!(devs[0].serial, "1d36d8f1");
        assert_eq!(devs[0].description, "product:OnePlus6 model:ONEPLUS_A6000");
    }

    #[test]
    fn devices_ignores_blank_tail() {
        let raw = "List of devices attached\nabc123\tdevice\n\n";
        assert_eq!(devices(raw).len(), 1);
    }
}
