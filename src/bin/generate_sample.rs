//! Write a deterministic sample licence CSV for trying out the dashboard.
//! The output intentionally contains a few exact duplicate rows and a few
//! invalid expiration dates so the cleaning diagnostics have something to
//! report.

use csv::WriterBuilder;

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

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const COUNTRIES: [&str; 8] = [
    "France",
    "Germany",
    "Italy",
    "Spain",
    "Sweden",
    "Denmark",
    "Netherlands",
    "United Kingdom of Great Britain and Northern Ireland",
];

const GROUPS: [&str; 10] = [
    "Indoor and outdoor paints and varnishes",
    "Textile products",
    "Tissue paper",
    "Hard surface cleaning products",
    "Hand dishwashing detergents",
    "Laundry detergents",
    "Lubricants",
    "Footwear",
    "Tourist accommodation",
    "Absorbent hygiene products",
];

const PRODUCT_NAMES: [&str; 6] = [
    "Eco wall paint",
    "Cotton towel",
    "Recycled tissue roll",
    "Citrus cleaner",
    "Bio detergent",
    "Trail shoe",
];

fn main() {
    let mut rng = SimpleRng::new(42);

    let output_path = "eu_ecolabel_data.csv";
    let mut writer = WriterBuilder::new()
        .delimiter(b';')
        .from_path(output_path)
        .expect("Failed to create output file");

    writer
        .write_record([
            "licence_number",
            "company_name",
            "company_country",
            "group_name",
            "product_or_service",
            "product_or_service_name",
            "expiration_date",
            "code_type",
        ])
        .expect("Failed to write header");

    let mut rows = 0usize;
    for licence in 0..200u32 {
        let country = *rng.pick(&COUNTRIES);
        let group = *rng.pick(&GROUPS);
        let company = format!("Company {:03}", rng.next_u64() % 120);
        let kind = if licence % 10 == 9 { "service" } else { "product" };
        let year = 2020 + (rng.next_u64() % 8) as i64;
        let month = 1 + (rng.next_u64() % 12) as i64;
        let day = 1 + (rng.next_u64() % 28) as i64;

        // One licence covers 1–3 product rows.
        let products = 1 + (rng.next_u64() % 3) as usize;
        for _ in 0..products {
            let date = if licence % 40 == 13 {
                "pending".to_string()
            } else {
                format!("{year:04}-{month:02}-{day:02}")
            };
            let record = [
                format!("EU/030/{licence:05}"),
                company.clone(),
                country.to_string(),
                group.to_string(),
                kind.to_string(),
                rng.pick(&PRODUCT_NAMES).to_string(),
                date,
                "EUEB".to_string(),
            ];
            writer.write_record(&record).expect("Failed to write row");
            rows += 1;

            // Some licences repeat their rows verbatim (exact duplicates).
            if licence % 25 == 7 {
                writer.write_record(&record).expect("Failed to write row");
                rows += 1;
            }
        }
    }

    writer.flush().expect("Failed to flush output");
    println!("Wrote {rows} rows to {output_path}");
}
