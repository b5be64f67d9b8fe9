//! Writing pipeline outputs to disk.
//!
//! Layout of an output directory:
//!
//! | file                   | columns / content                       |
//! |------------------------|-----------------------------------------|
//! | `filtered_ratings.csv` | `user_id,item_id,rating`                |
//! | `interactions.csv`     | `user_idx,item_idx,rating`              |
//! | `user_index.csv`       | `idx,user_id`                           |
//! | `item_index.csv`       | `idx,item_id`                           |
//! | `mappings.json`        | ordered id lists plus `n_users/n_items` |
//! | `report.json`          | the run's [`PipelineReport`]            |
//!
//! Every file is a pure function of the run's outputs, so two runs over the
//! same input and thresholds write identical bytes. CSV tables always start
//! with their header row, even when they hold no records.

use crate::error::Result;
use crate::index_map::{IdIndex, IndexMap};
use crate::processor::{PipelineReport, ProcessedRatings};
use crate::profiles::{ItemStats, UserProfile};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const FILTERED_RATINGS_FILE: &str = "filtered_ratings.csv";
pub const INTERACTIONS_FILE: &str = "interactions.csv";
pub const USER_INDEX_FILE: &str = "user_index.csv";
pub const ITEM_INDEX_FILE: &str = "item_index.csv";
pub const MAPPINGS_FILE: &str = "mappings.json";
pub const REPORT_FILE: &str = "report.json";
pub const USER_PROFILES_FILE: &str = "user_profiles.csv";
pub const ITEM_STATS_FILE: &str = "item_stats.csv";

const RATING_COLUMNS: [&str; 3] = ["user_id", "item_id", "rating"];
const INTERACTION_COLUMNS: [&str; 3] = ["user_idx", "item_idx", "rating"];
const USER_PROFILE_COLUMNS: [&str; 3] = ["user_id", "avg_rating", "total_ratings"];
const ITEM_STATS_COLUMNS: [&str; 4] = ["item_id", "avg_rating", "total_ratings", "rating_std"];

/// Mapping metadata as stored in `mappings.json`
#[derive(Serialize)]
struct Mappings<'a> {
    #[serde(flatten)]
    map: &'a IndexMap,
    n_users: usize,
    n_items: usize,
}

/// Write the core outputs of a run into `dir`, creating it if needed.
///
/// Returns the paths written, in the order above.
pub fn write_outputs(dir: &Path, processed: &ProcessedRatings) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let path = dir.join(FILTERED_RATINGS_FILE);
    write_csv(&path, &RATING_COLUMNS, processed.filtered.iter())?;
    written.push(path);

    let path = dir.join(INTERACTIONS_FILE);
    write_csv(&path, &INTERACTION_COLUMNS, processed.interactions.records.iter())?;
    written.push(path);

    let path = dir.join(USER_INDEX_FILE);
    write_index(&path, &processed.index_map.users, "user_id")?;
    written.push(path);

    let path = dir.join(ITEM_INDEX_FILE);
    write_index(&path, &processed.index_map.items, "item_id")?;
    written.push(path);

    let path = dir.join(MAPPINGS_FILE);
    write_json(
        &path,
        &Mappings {
            map: &processed.index_map,
            n_users: processed.index_map.n_users(),
            n_items: processed.index_map.n_items(),
        },
    )?;
    written.push(path);

    let path = dir.join(REPORT_FILE);
    write_report(&path, &processed.report)?;
    written.push(path);

    tracing::info!("Wrote {} files to {}", written.len(), dir.display());
    Ok(written)
}

/// Write per-user profiles and per-item statistics into `dir`
pub fn write_profiles(
    dir: &Path,
    users: &[UserProfile],
    items: &[ItemStats],
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let users_path = dir.join(USER_PROFILES_FILE);
    write_csv(&users_path, &USER_PROFILE_COLUMNS, users.iter())?;

    let items_path = dir.join(ITEM_STATS_FILE);
    write_csv(&items_path, &ITEM_STATS_COLUMNS, items.iter())?;

    Ok(vec![users_path, items_path])
}

pub fn write_report(path: &Path, report: &PipelineReport) -> Result<()> {
    write_json(path, report)
}

/// Write `header` then one record per row.
///
/// The header is written by hand rather than inferred from the first row, so
/// an empty table still names its columns.
fn write_csv<T: Serialize>(
    path: &Path,
    header: &[&str],
    rows: impl Iterator<Item = T>,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    writer.write_record(header)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_index(path: &Path, index: &IdIndex, id_column: &str) -> Result<()> {
    write_csv(path, &["idx", id_column], index.iter())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ratings-export-{}-{}",
            std::process::id(),
            name
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_write_profiles() {
        let dir = scratch_dir("profiles");
        let users = vec![
            UserProfile {
                user_id: "007".to_string(),
                avg_rating: 4.5,
                total_ratings: 2,
            },
            UserProfile {
                user_id: "276725".to_string(),
                avg_rating: 0.0,
                total_ratings: 1,
            },
        ];
        let items = vec![
            ItemStats {
                item_id: "034545104X".to_string(),
                avg_rating: 4.5,
                total_ratings: 2,
                rating_std: Some(0.5),
            },
            ItemStats {
                item_id: "0155061224".to_string(),
                avg_rating: 2.25,
                total_ratings: 1,
                rating_std: None,
            },
        ];

        let written = write_profiles(&dir, &users, &items).unwrap();
        assert_eq!(
            written,
            vec![dir.join(USER_PROFILES_FILE), dir.join(ITEM_STATS_FILE)]
        );

        assert_eq!(
            fs::read_to_string(dir.join(USER_PROFILES_FILE)).unwrap(),
            "user_id,avg_rating,total_ratings\n007,4.5,2\n276725,0.0,1\n"
        );
        // a single rating has no sample deviation; the field stays empty
        assert_eq!(
            fs::read_to_string(dir.join(ITEM_STATS_FILE)).unwrap(),
            "item_id,avg_rating,total_ratings,rating_std\n\
             034545104X,4.5,2,0.5\n\
             0155061224,2.25,1,\n"
        );

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_empty_profiles_keep_headers() {
        let dir = scratch_dir("empty-profiles");
        write_profiles(&dir, &[], &[]).unwrap();

        assert_eq!(
            fs::read_to_string(dir.join(USER_PROFILES_FILE)).unwrap(),
            "user_id,avg_rating,total_ratings\n"
        );
        assert_eq!(
            fs::read_to_string(dir.join(ITEM_STATS_FILE)).unwrap(),
            "item_id,avg_rating,total_ratings,rating_std\n"
        );

        let _ = fs::remove_dir_all(&dir);
    }
}
