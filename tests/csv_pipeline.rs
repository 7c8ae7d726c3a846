use fortuna::application::evaluator::{EvaluationSettings, Evaluator};
use fortuna::config::LotteryCatalog;
use fortuna::domain::errors::FortunaError;
use fortuna::domain::ports::DrawSource;
use fortuna::infrastructure::csv_source::CsvDrawSource;
use fortuna::infrastructure::rng::SeededGenerator;
use fortuna::infrastructure::synthetic::ensure_data_files;
use std::fs;

#[test]
fn test_generated_catalog_files_load_back() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    let catalog = LotteryCatalog::builtin();
    let lotteries: Vec<_> = catalog.iter().cloned().collect();

    let written =
        ensure_data_files(&data_dir, &lotteries, 25, &mut SeededGenerator::new(42)).unwrap();
    assert_eq!(written.len(), lotteries.len());

    let source = CsvDrawSource::new(&data_dir);
    for lottery in &lotteries {
        let draws = source.load(lottery).unwrap();
        assert_eq!(draws.len(), 25, "{}", lottery.id);
        for draw in &draws {
            assert_eq!(draw.numbers().len(), lottery.count);
            assert!(draw.numbers().windows(2).all(|w| w[0] < w[1]));
            let expected_special = lottery.special.as_ref().map_or(0, |s| s.count);
            assert_eq!(draw.special().len(), expected_special);
        }
    }

    // Existing files are left alone
    let again =
        ensure_data_files(&data_dir, &lotteries, 25, &mut SeededGenerator::new(1)).unwrap();
    assert!(again.is_empty());
}

#[test]
fn test_hand_written_file_with_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = LotteryCatalog::builtin();
    let fast5 = catalog.find("fast5").unwrap();

    fs::write(
        dir.path().join(&fast5.file_name),
        "Date,Number1,Number2,Number3,Number4,Number5\n\
         2024-01-08,5,12,19,33,41\n\
         2024-01-01,1,2,3,4,5\n\
         2024-01-15,1,2,3,4,99\n\
         2024-01-22,7,7,8,9,10\n\
         someday,10,20,30,40,45\n",
    )
    .unwrap();

    let draws = CsvDrawSource::new(dir.path()).load(fast5).unwrap();
    // Out-of-range and duplicate rows are skipped; the undated row stays
    assert_eq!(draws.len(), 3);
    assert!(draws.iter().any(|d| d.date().is_none()));
}

#[test]
fn test_missing_file_is_data_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = LotteryCatalog::builtin();
    let lottery = catalog.find("omillionaire").unwrap();

    let err = CsvDrawSource::new(dir.path()).load(lottery).unwrap_err();
    assert!(matches!(err, FortunaError::DataUnavailable { .. }));
}

#[test]
fn test_csv_history_through_evaluator() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = LotteryCatalog::builtin();
    let lottery = catalog.find("powerball").unwrap().clone();

    ensure_data_files(
        dir.path(),
        std::slice::from_ref(&lottery),
        60,
        &mut SeededGenerator::new(3),
    )
    .unwrap();
    let draws = CsvDrawSource::new(dir.path()).load(&lottery).unwrap();

    let mut settings = EvaluationSettings::default();
    settings.forest.n_trees = 10;
    let result = Evaluator::new(lottery, settings)
        .evaluate(&draws, 50, 9)
        .unwrap();

    assert!(!result.is_fallback());
    assert_eq!(result.match_distribution.total(), 50);
    assert_eq!(result.match_distribution.draw_size(), 5);
}
