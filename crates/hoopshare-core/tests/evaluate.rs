// End-to-end calculator tests against a full season record.

mod common;

use common::{approx_eq, lebron_2008_09, no_field_goal_attempts};
use hoopshare_core::{Calculator, FailureCause, Metric};

// ===========================================================================
// Golden season
// ===========================================================================

#[test]
fn golden_season_reproduces_defensive_chain() {
    let out = Calculator::new().evaluate(&lebron_2008_09());

    // 6454 + 0.44 * 2012 - 886 + 1045
    let team_poss = out.metric(Metric::TeamPoss).unwrap();
    assert!(approx_eq(team_poss, 7498.28, 1e-9));

    let team_drtg = out.metric(Metric::TeamDefensiveRating).unwrap();
    assert!(approx_eq(team_drtg, 100.0 * 7491.0 / team_poss, 1e-12));
    assert!(approx_eq(team_drtg, 99.902_911_067_604_83, 1e-9));

    assert!(approx_eq(out.metric(Metric::DPtsPerScPoss).unwrap(), 2.265_549_083_270_265, 1e-9));
    assert!(approx_eq(out.metric(Metric::StopsTeam).unwrap(), 338.820_947_087_964_4, 1e-8));
    assert!(approx_eq(out.metric(Metric::Stops).unwrap(), 680.056_137_309_99, 1e-8));
    assert!(approx_eq(out.metric(Metric::StopPercent).unwrap(), 0.587_408_687_331_897_5, 1e-9));
    assert!(approx_eq(out.metric(Metric::DRtg).unwrap(), 98.617_246_257_693_76, 1e-8));
}

#[test]
fn golden_season_offense() {
    let out = Calculator::new().evaluate(&lebron_2008_09());

    let expected = [
        (Metric::TeamScoringPoss, 3779.261_033_797_217),
        (Metric::TeamORBPercent, 0.277_221_526_908_635_8),
        (Metric::TeamPlayPercent, 0.455_124_284_520_005),
        (Metric::TeamORBWeight, 0.685_313_321_227_355_2),
        (Metric::QAst, 0.416_259_134_987_423_4),
        (Metric::FGPart, 701.955_260_022_678),
        (Metric::ASTPart, 151.266_783_722_371_43),
        (Metric::FTPart, 289.984_251_968_503_94),
        (Metric::ORBPart, 33.061_689_909_536_604),
        (Metric::ScoringPossessions, 1092.674_848_748_401_2),
        (Metric::FGxPoss, 579.579_324_155_194),
        (Metric::FTxPoss, 14.815_748_031_496_069),
        (Metric::TotalPossessions, 1928.069_920_935_091_2),
        (Metric::PProdFGPart, 1521.347_901_950_290_6),
        (Metric::PProdASTPart, 338.030_116_782_191_4),
        (Metric::PProdORBPart, 71.936_358_376_643_16),
        (Metric::PointsProduced, 2345.919_314_910_618_6),
        (Metric::FloorPercentage, 0.566_719_514_102_718_3),
        (Metric::ORtg, 121.671_900_455_398_19),
        (Metric::MarginalOffensePlayer, 424.867_568_487_731),
        (Metric::MarginalPointsPerWin, 30.953_107_960_741_548),
        (Metric::OffensiveWinShares, 13.726_168_274_494_409),
    ];
    for (metric, value) in expected {
        let got = out.metric(metric).unwrap();
        assert!(
            approx_eq(got, value, 1e-8 * value.abs().max(1.0)),
            "{metric}: expected {value}, got {got}"
        );
    }
}

#[test]
fn golden_season_win_shares() {
    let out = Calculator::new().evaluate(&lebron_2008_09());

    assert!(approx_eq(out.metric(Metric::OpponentPoss).unwrap(), 7344.96, 1e-9));
    assert!(approx_eq(out.metric(Metric::MarginalDefense).unwrap(), 208.061_350_055_152_47, 1e-7));
    assert!(approx_eq(out.metric(Metric::DefensiveWinShares).unwrap(), 6.721_824_196_750_804, 1e-9));
    assert!(approx_eq(out.metric(Metric::WinShares).unwrap(), 20.447_992_471_245_215, 1e-9));
    assert!(approx_eq(out.metric(Metric::TeamFGxPoss).unwrap(), 2413.976_020_025_031, 1e-8));
    assert!(approx_eq(out.metric(Metric::TeamFTxPoss).unwrap(), 47.538_966_202_783_29, 1e-9));
}

#[test]
fn golden_season_is_complete_and_keeps_inputs() {
    let record = lebron_2008_09();
    let out = Calculator::new().evaluate(&record);

    assert!(out.is_complete(), "unexpected failures: {:?}", out.failures());
    for metric in Metric::ALL {
        let value = out.metric(metric).unwrap();
        assert!(value.is_finite(), "{metric} is not finite");
    }
    for (name, value) in record.iter() {
        assert_eq!(out.get(name), Some(value), "input {name} not carried through");
    }
}

// ===========================================================================
// Memoization and purity
// ===========================================================================

#[test]
fn shared_metrics_are_read_identically_by_consumers() {
    let out = Calculator::new().evaluate(&lebron_2008_09());
    let v = |m: Metric| out.metric(m).unwrap();

    // Recombine ScoringPossessions from the stored shared values with the
    // same operation order; a recomputed sub-expression anywhere would be
    // allowed to drift, the memoized one is not.
    let orb_ratio = out.get("Team_ORB").unwrap() / v(Metric::TeamScoringPoss);
    let adjust = 1.0 - orb_ratio * v(Metric::TeamORBWeight) * v(Metric::TeamPlayPercent);
    let scoring = (v(Metric::FGPart) + v(Metric::ASTPart) + v(Metric::FTPart)) * adjust
        + v(Metric::ORBPart);
    assert_eq!(scoring.to_bits(), v(Metric::ScoringPossessions).to_bits());

    let total = v(Metric::ScoringPossessions)
        + v(Metric::FGxPoss)
        + v(Metric::FTxPoss)
        + out.get("TOV").unwrap();
    assert_eq!(total.to_bits(), v(Metric::TotalPossessions).to_bits());
}

#[test]
fn partial_evaluation_agrees_bit_for_bit() {
    let record = lebron_2008_09();
    let calc = Calculator::new();
    let full = calc.evaluate(&record);
    let partial = calc.evaluate_only(&record, &[Metric::TeamORBWeight, Metric::QAst]);

    for metric in [
        Metric::TeamScoringPoss,
        Metric::TeamORBWeight,
        Metric::TeamPlayPercent,
        Metric::QAst,
    ] {
        assert_eq!(
            full.metric(metric).unwrap().to_bits(),
            partial.metric(metric).unwrap().to_bits()
        );
    }
    assert_eq!(partial.metric(Metric::DRtg), None);
}

#[test]
fn evaluation_is_idempotent() {
    let record = lebron_2008_09();
    let calc = Calculator::new();
    let first = calc.evaluate(&record);
    let second = calc.evaluate(&record);
    assert_eq!(first, second);
    assert_eq!(record, lebron_2008_09());
}

// ===========================================================================
// Not-applicable outcomes
// ===========================================================================

#[test]
fn zero_field_goal_attempts_fail_only_dependent_metrics() {
    let out = Calculator::new().evaluate(&no_field_goal_attempts());

    let fg = out.failure(Metric::FGPart).unwrap();
    assert_eq!(fg.origin, Metric::FGPart);
    assert_eq!(
        fg.cause,
        FailureCause::DivisionByZero {
            denominator: "2 * FGA"
        }
    );

    for metric in [
        Metric::ScoringPossessions,
        Metric::TotalPossessions,
        Metric::FloorPercentage,
    ] {
        let failure = out.failure(metric).unwrap();
        assert_eq!(failure.origin, Metric::FGPart, "{metric}");
        assert_eq!(out.metric(metric), None);
    }
    for metric in [
        Metric::PProdFGPart,
        Metric::PointsProduced,
        Metric::MarginalOffensePlayer,
        Metric::OffensiveWinShares,
        Metric::WinShares,
    ] {
        assert_eq!(out.failure(metric).unwrap().origin, Metric::PProdFGPart, "{metric}");
    }
    assert!(out.failure(Metric::ORtg).is_some());

    // Rebounding, assist and defensive metrics do not touch FGA as a divisor.
    for metric in [
        Metric::TeamORBWeight,
        Metric::ORBPart,
        Metric::ASTPart,
        Metric::PProdASTPart,
        Metric::FTPart,
        Metric::FGxPoss,
        Metric::DRtg,
        Metric::DefensiveWinShares,
    ] {
        assert!(out.metric(metric).unwrap().is_finite(), "{metric}");
    }
    assert_eq!(out.metric(Metric::FGxPoss), Some(0.0));
}

#[test]
fn failure_message_names_origin() {
    let record = lebron_2008_09()
        .with_value("FTA", 0.0)
        .and_then(|r| r.with_value("FTM", 0.0))
        .unwrap();
    let out = Calculator::new().evaluate(&record);

    assert_eq!(
        out.failure(Metric::OffensiveWinShares).unwrap().to_string(),
        "OffensiveWinShares: unavailable (division by zero in FTPart: FTA)"
    );
    assert!(out.metric(Metric::DefensiveWinShares).is_some());
}

#[test]
fn missing_league_context_only_blocks_win_shares() {
    let record = lebron_2008_09().without("LPPG");
    let out = Calculator::new().evaluate(&record);

    for metric in [
        Metric::MarginalPointsPerWin,
        Metric::OffensiveWinShares,
        Metric::MarginalPPW,
        Metric::DefensiveWinShares,
        Metric::WinShares,
    ] {
        let failure = out.failure(metric).unwrap();
        assert_eq!(
            failure.cause,
            FailureCause::MissingFields {
                fields: vec!["LPPG".into()]
            },
            "{metric}"
        );
    }
    assert_eq!(out.failures().len(), 5);
    assert!(out.metric(Metric::ORtg).is_some());
    assert!(out.metric(Metric::DRtg).is_some());
}

#[test]
fn zero_team_possessions_block_defensive_rating() {
    let record = ["Team_FGA", "Team_FTA", "Team_ORB", "Team_TOV"]
        .into_iter()
        .try_fold(lebron_2008_09(), |r, f| r.with_value(f, 0.0))
        .unwrap();
    let out = Calculator::new().evaluate(&record);

    assert_eq!(out.metric(Metric::TeamPoss), Some(0.0));
    let failure = out.failure(Metric::TeamDefensiveRating).unwrap();
    assert_eq!(
        failure.cause,
        FailureCause::DivisionByZero {
            denominator: "TeamPoss"
        }
    );
    assert_eq!(out.failure(Metric::DRtg).unwrap().origin, Metric::TeamDefensiveRating);
}

// ===========================================================================
// Serialization
// ===========================================================================

#[test]
fn derived_metrics_serialize_values_and_failures() {
    let out = Calculator::new().evaluate(&no_field_goal_attempts());
    let json = serde_json::to_value(&out).unwrap();

    assert!(json["values"]["DRtg"].is_number());
    assert!(json["values"].get("FGPart").is_none());
    let first = &json["failures"][0];
    assert_eq!(first["metric"], "FGPart");
    assert_eq!(first["cause"]["kind"], "division_by_zero");
    assert_eq!(first["cause"]["denominator"], "2 * FGA");
}
