use data_loader::{MalformedPolicy, RatingsSummary, RecordCleaner, SourceOptions, parser};
use std::path::Path;
use std::time::Instant;

fn main() {
    let path = Path::new("data/raw/Ratings.csv");

    println!("Loading ratings from {}...\n", path.display());

    let start = Instant::now();
    let file = parser::read_ratings(path, &SourceOptions::default())
        .expect("Failed to read ratings");
    let read_elapsed = start.elapsed();

    let cleaner = RecordCleaner::new(file.schema, MalformedPolicy::Skip);
    let batch = cleaner.clean_all(&file.rows).expect("Failed to clean ratings");
    let elapsed = start.elapsed();

    let summary = RatingsSummary::from_triples(&batch.triples);

    println!("\n=== Load Complete ===");
    println!("Read time: {:?}", read_elapsed);
    println!("Total time: {:?}", elapsed);
    println!("Rows: {}", batch.rows_seen);
    println!("Ratings: {}", summary.count);
    println!("Users: {}", summary.unique_users);
    println!("Items: {}", summary.unique_items);
    println!("Rejected: {}", batch.rejected.total());
    println!("\nPerformance: {:.0} rows/second",
             batch.rows_seen as f64 / elapsed.as_secs_f64());
}
