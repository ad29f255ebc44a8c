use std::path::Path;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Monitoring locations with a baseline AQI and the years they reported.
/// Panjagutta comes online late and Zoo Park drops out early, so the
/// generated files exercise the union-of-columns path.
const LOCATIONS: [(&str, f64, i32, i32); 8] = [
    ("Abids", 115.0, 2016, 2023),
    ("Balanagar", 140.0, 2016, 2023),
    ("Charminar", 125.0, 2016, 2023),
    ("Jubilee Hills", 85.0, 2016, 2023),
    ("Jeedimetla", 150.0, 2016, 2023),
    ("Panjagutta", 110.0, 2019, 2023),
    ("Sanathnagar", 130.0, 2016, 2023),
    ("Zoo Park", 95.0, 2016, 2021),
];

/// Winter pollution peaks, monsoon washout.
fn seasonal_factor(month_idx: usize) -> f64 {
    match month_idx {
        0 | 1 | 10 | 11 => 1.35,
        2 | 3 => 1.1,
        4 | 5 => 0.95,
        6 | 7 | 8 => 0.6,
        _ => 1.0,
    }
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let out_dir = Path::new("Data");
    std::fs::create_dir_all(out_dir).expect("Failed to create Data directory");

    for year in 2016..=2023 {
        let active: Vec<&(&str, f64, i32, i32)> = LOCATIONS
            .iter()
            .filter(|(_, _, from, to)| (*from..=*to).contains(&year))
            .collect();

        let path = out_dir.join(format!("hyd_air_quality_{year}.csv"));
        let mut writer = csv::Writer::from_path(&path).expect("Failed to create output file");

        let mut header = vec!["Month".to_string()];
        header.extend(active.iter().map(|(name, _, _, _)| name.to_string()));
        writer.write_record(&header).expect("Failed to write header");

        // Air slowly improves over the years.
        let drift = 1.0 - 0.02 * (year - 2016) as f64;

        for (month_idx, month) in MONTHS.iter().enumerate() {
            let mut record = vec![month.to_string()];
            for (_, baseline, _, _) in &active {
                // A few readings go missing, as in the real exports.
                if rng.next_f64() < 0.03 {
                    record.push(String::new());
                    continue;
                }
                let aqi = rng
                    .gauss(baseline * seasonal_factor(month_idx) * drift, 12.0)
                    .max(5.0);
                record.push(format!("{}", aqi.round() as i64));
            }
            writer.write_record(&record).expect("Failed to write row");
        }
        writer.flush().expect("Failed to flush CSV");

        println!("Wrote {}", path.display());
    }

    println!(
        "Generated {} yearly tables for {} locations",
        2023 - 2016 + 1,
        LOCATIONS.len()
    );
}
