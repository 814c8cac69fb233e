use orgchart_core::RawRecord;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A balanced org of `count` employees where every manager has up to
/// `fan_out` reports, filled level by level.
pub fn synthetic_records(count: usize, fan_out: usize) -> Vec<RawRecord> {
    let fan_out = fan_out.max(1);
    (0..count)
        .map(|i| {
            let id = format!("e{i}");
            let name = format!("Employee {i:06}");
            let parent = (i > 0).then(|| format!("e{}", (i - 1) / fan_out));
            RawRecord::new(&id, parent.as_deref(), &name)
                .with_title(&format!("Level {}", level_of(i, fan_out)))
        })
        .collect()
}

fn level_of(mut i: usize, fan_out: usize) -> usize {
    let mut level = 0;
    while i > 0 {
        i = (i - 1) / fan_out;
        level += 1;
    }
    level
}

pub fn synthetic_json(count: usize, fan_out: usize) -> anyhow::Result<String> {
    let fan_out = fan_out.max(1);
    let records: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            let parent = (i > 0).then(|| format!("e{}", (i - 1) / fan_out));
            serde_json::json!({
                "id": format!("e{i}"),
                "parentId": parent,
                "name": format!("Employee {i:06}"),
                "title": format!("Level {}", level_of(i, fan_out)),
            })
        })
        .collect();
    Ok(serde_json::to_string(&records)?)
}

pub fn write_synthetic_dataset(count: usize, fan_out: usize) -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;
    let path = temp_dir.path().join("staff.json");
    fs::write(&path, synthetic_json(count, fan_out)?)?;
    Ok((temp_dir, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use orgchart_core::Dataset;

    #[test]
    fn synthetic_records_form_one_tree() {
        let records = synthetic_records(13, 3);
        assert_eq!(records.len(), 13);
        assert!(records[0].is_root_candidate());
        assert_eq!(records[4].parent_id, Some(Some("e1".to_string())));
        assert_eq!(records[12].title, "Level 2");
    }

    #[test]
    fn synthetic_json_parses() {
        let dataset = Dataset::from_json_str(&synthetic_json(5, 2).unwrap()).unwrap();
        assert_eq!(dataset.records.len(), 5);
        assert!(dataset.records[0].is_root_candidate());
    }
}
