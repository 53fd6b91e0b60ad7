use std::fmt::Write as _;
use std::path::{Path, PathBuf};

pub const HEADER: &str = "brand,model,battery_capacity_kWh,top_speed_kmh,efficiency_wh_per_km,\
acceleration_0_100_s,length_mm,width_mm,height_mm,range_km";

/// Deterministic EV table: range follows battery / efficiency with a small
/// drag penalty for tall cars. Every tenth row has a hole and gets dropped.
pub fn synthetic_csv(n: usize) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for i in 0..n {
        let t = i as f64;
        let battery = 40.0 + (t * 7.3) % 60.0;
        let speed = 150.0 + (t * 11.0) % 100.0;
        let efficiency = 140.0 + (t * 13.7) % 80.0;
        let accel = 4.0 + (t * 3.1) % 8.0;
        let length = 4000.0 + (t * 37.0) % 900.0;
        let width = 1750.0 + (t * 17.0) % 200.0;
        let height = 1450.0 + (t * 23.0) % 300.0;
        let range = battery * 1000.0 / efficiency - 0.05 * (height - 1600.0);

        if i % 10 == 9 {
            writeln!(out, "Brand{i},M{i},{battery},,{efficiency},{accel},{length},{width},{height},{range:.1}")
                .unwrap();
        } else {
            writeln!(
                out,
                "Brand{i},M{i},{battery},{speed},{efficiency},{accel},{length},{width},{height},{range:.1}"
            )
            .unwrap();
        }
    }
    out
}

pub fn write_csv(dir: &Path, n: usize) -> PathBuf {
    let path = dir.join("evs.csv");
    std::fs::write(&path, synthetic_csv(n)).unwrap();
    path
}
