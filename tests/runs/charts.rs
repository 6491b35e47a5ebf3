use pretty_assertions::assert_eq;
use speedrun_ingest::chart::aggregate::month_start;
use speedrun_ingest::{ChartKind, ChartPoint, ChartX, DaoError, FeedConfig};

use crate::fixtures::{game, run};
use crate::setup;

fn month(label: &str) -> ChartX {
    ChartX::Time(month_start(label).unwrap())
}

#[test]
fn game_volume_counts_verified_runs_per_month() {
    let (_, runs) = setup(FeedConfig::default(), vec![game("g1", &[]), game("g2", &[])]);
    runs.store(vec![
        run("a").date("2015-01-03").verified("2015-01-04T00:00:00Z").build(),
        run("b").date("2015-01-20").verified("2015-01-21T00:00:00Z").build(),
        run("c").date("2015-04-02").verified("2015-04-03T00:00:00Z").build(),
        // Unverified and other-game runs are left out.
        run("d").date("2015-02-02").build(),
        run("e").game("g2").date("2015-02-02").verified("2015-02-03T00:00:00Z").build(),
    ])
    .unwrap();

    let chart = runs.game_submission_volume("g1").unwrap();

    assert_eq!(chart.item_id, "g1");
    assert_eq!(chart.item_type, "runs");
    assert_eq!(chart.chart_type, ChartKind::Bar);
    let xs: Vec<ChartX> = chart.main().iter().map(|p| p.x.clone()).collect();
    let ys: Vec<f64> = chart.main().iter().map(|p| p.y).collect();
    assert_eq!(
        xs,
        vec![month("2015-01"), month("2015-02"), month("2015-03"), month("2015-04")]
    );
    assert_eq!(ys, vec![2.0, 0.0, 0.0, 1.0]);
}

#[test]
fn runs_before_the_first_year_are_dropped() {
    let (_, runs) = setup(FeedConfig::default(), vec![game("g1", &[])]);
    runs.store(vec![
        run("old").date("2005-06-01").verified("2005-06-02T00:00:00Z").build(),
        run("new").date("2012-06-01").verified("2012-06-02T00:00:00Z").build(),
    ])
    .unwrap();

    let chart = runs.game_submission_volume("g1").unwrap();
    assert_eq!(chart.main(), &[ChartPoint::time(month_start("2012-06").unwrap(), 1.0)]);
}

#[test]
fn leaderboard_volume_narrows_by_level() {
    let (_, runs) = setup(FeedConfig::default(), vec![game("g1", &[])]);
    runs.store(vec![
        run("a").category("c1").level("l1").date("2016-05-01").verified("2016-05-02T00:00:00Z").build(),
        run("b").category("c1").level("l2").date("2016-05-01").verified("2016-05-02T00:00:00Z").build(),
        run("c").category("c1").date("2016-05-09").verified("2016-05-10T00:00:00Z").build(),
    ])
    .unwrap();

    let whole = runs.leaderboard_submission_volume("c1", None).unwrap();
    assert_eq!(whole.item_id, "c1");
    assert_eq!(whole.main()[0].y, 3.0);

    let level = runs.leaderboard_submission_volume("c1", Some("l1")).unwrap();
    assert_eq!(level.item_id, "c1_l1");
    assert_eq!(level.main(), &[ChartPoint::time(month_start("2016-05").unwrap(), 1.0)]);
}

#[test]
fn empty_leaderboard_has_no_points() {
    let (_, runs) = setup(FeedConfig::default(), vec![]);
    let chart = runs.leaderboard_submission_volume("nothing", None).unwrap();
    assert!(chart.main().is_empty());
}

#[test]
fn favorite_games_sorted_by_run_count() {
    let (_, runs) = setup(
        FeedConfig::default(),
        vec![game("g1", &[]), game("g2", &[]), game("g3", &[])],
    );
    runs.store(vec![
        run("a").game("g2").player("p1").build(),
        run("b").game("g2").player("p1").build(),
        run("c").game("g1").player("p1").build(),
        run("d").game("g3").player("someone-else").build(),
    ])
    .unwrap();

    let chart = runs.player_favorite_games("p1").unwrap();
    assert_eq!(chart.item_id, "p1");
    assert_eq!(chart.item_type, "games");
    assert_eq!(chart.chart_type, ChartKind::Pie);
    assert_eq!(
        chart.main(),
        &[ChartPoint::label("g2", 2.0), ChartPoint::label("g1", 1.0)]
    );
}

#[test]
fn empty_chart_key_is_rejected() {
    let (_, runs) = setup(FeedConfig::default(), vec![]);
    assert!(matches!(
        runs.game_submission_volume(""),
        Err(DaoError::InvalidKey { .. })
    ));
}

#[test]
fn pb_chart_plots_one_series_per_leaderboard() {
    let (_, runs) = setup(FeedConfig::default(), vec![game("g1", &[]), game("g2", &[])]);
    runs.store(vec![
        run("a").category("any").date("1970-01-03").time(90.0).build(),
        run("b").category("any").date("1970-01-02").time(120.0).build(),
        run("c").category("any").level("w1").date("1970-01-02").time(30.0).build(),
        // Other games and other players are left out.
        run("d").game("g2").category("any").date("1970-01-02").time(10.0).build(),
        run("e").player("p2").category("any").date("1970-01-02").time(10.0).build(),
    ])
    .unwrap();

    let chart = runs.player_pb_chart("p1", "g1").unwrap();

    assert_eq!(chart.item_id, "p1_g1");
    assert_eq!(chart.chart_type, ChartKind::Line);
    assert_eq!(chart.data.len(), 2);
    assert_eq!(
        chart.data["any"],
        vec![ChartPoint::time(86_400, 120.0), ChartPoint::time(172_800, 90.0)]
    );
    assert_eq!(chart.data["any_w1"], vec![ChartPoint::time(86_400, 30.0)]);
}

#[test]
fn pb_chart_needs_player_and_game() {
    let (_, runs) = setup(FeedConfig::default(), vec![]);
    assert!(matches!(
        runs.player_pb_chart("p1", ""),
        Err(DaoError::InvalidKey { .. })
    ));
    assert!(runs.player_pb_chart("p1", "g1").unwrap().data.is_empty());
}
