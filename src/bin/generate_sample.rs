use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook};

/// Minimal deterministic PRNG (xorshift64*)
struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        SimpleRng {
            state: seed.max(1),
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// True with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }
}

const HEADERS: [&str; 6] = ["id", "customer", "email", "phone", "region", "balance"];
const NAMES: [&str; 8] = ["Ada", "Bo", "Chen", "Dana", "Eli", "Fay", "Gus", "Hana"];
const REGIONS: [&str; 4] = ["north", "south", "east", "west"];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Customers")?;
    for (c, name) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, c as u16, *name, &bold)?;
    }

    for r in 1..=200u32 {
        // The id column is blank often enough to give the primary-column
        // check something to find.
        if !rng.chance(0.3) {
            sheet.write_number(r, 0, r as f64)?;
        }
        let name = NAMES[(rng.next_u64() % NAMES.len() as u64) as usize];
        sheet.write_string(r, 1, name)?;
        if !rng.chance(0.25) {
            sheet.write_string(r, 2, format!("{}{}@example.com", name.to_lowercase(), r))?;
        }
        if !rng.chance(0.4) {
            sheet.write_string(r, 3, format!("555-{:04}", rng.next_u64() % 10_000))?;
        }
        if !rng.chance(0.1) {
            sheet.write_string(r, 4, REGIONS[(rng.next_u64() % 4) as usize])?;
        }
        if !rng.chance(0.2) {
            let balance = (rng.next_f64() * 10_000.0).round() / 100.0;
            sheet.write_number(r, 5, balance)?;
        }
    }

    let path = "sample.xlsx";
    workbook
        .save(path)
        .with_context(|| format!("saving {path}"))?;
    println!("Wrote 200 rows to {path}");
    Ok(())
}
