//! Bulk roster transfer: `Name,Rank,PlayCount` CSV export and import.

use crate::models::{Player, Rank, Session};

/// Header row written on export.
pub const CSV_HEADER: [&str; 3] = ["Name", "Rank", "PlayCount"];

/// Export every player (queue, then courts) as CSV. Commas in names are stripped.
pub fn export_csv(session: &Session) -> Result<String, csv::Error> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer.write_record(CSV_HEADER)?;
        for p in session.all_players() {
            let safe_name = p.name.replace(',', "");
            writer.write_record([
                safe_name.as_str(),
                p.rank.as_str(),
                p.play_count.to_string().as_str(),
            ])?;
        }
        writer.flush()?;
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Import players from CSV text into the back of the queue. Returns how many were added.
///
/// - The first row is a header if its first cell contains "name" (any case).
/// - Rows need at least a name and a rank; an unknown rank becomes Beginner.
/// - A missing or malformed play count becomes 0.
/// - Names already queued or playing (case-insensitive) are skipped.
pub fn import_csv(session: &mut Session, text: &str) -> usize {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut imported = 0;
    for (row, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                log::warn!("skipping malformed roster row {}: {}", row + 1, e);
                continue;
            }
        };
        if row == 0
            && record
                .get(0)
                .is_some_and(|cell| cell.to_lowercase().contains("name"))
        {
            continue;
        }
        if record.len() < 2 {
            continue;
        }
        let name = record.get(0).unwrap_or_default();
        if name.is_empty() || session.name_taken(name) {
            continue;
        }
        let rank = record
            .get(1)
            .and_then(|r| r.parse::<Rank>().ok())
            .unwrap_or(Rank::Beginner);
        let play_count = record
            .get(2)
            .and_then(|c| c.parse::<u32>().ok())
            .unwrap_or(0);
        session
            .queue
            .push(Player::with_play_count(name, rank, play_count));
        imported += 1;
    }

    log::info!("Imported {} player(s) from roster CSV", imported);
    imported
}
