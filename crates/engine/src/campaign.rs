//! Built-in adventure campaign.

use crate::adventure::{
    AdventureLevelConfig, BossConfig, Gimmick, Objective, ObjectiveKind, Rewards, StoryNodes,
};

fn level(id: u32, name: &str, objective: Objective, gimmicks: Vec<Gimmick>, coins: u32) -> AdventureLevelConfig {
    AdventureLevelConfig {
        id,
        name: name.to_string(),
        objective,
        gimmicks,
        boss: None,
        story: StoryNodes::default(),
        rewards: Rewards { coins, xp: coins / 2 },
        start_level: 0,
    }
}

fn lines(target: u32) -> Objective {
    Objective::new(ObjectiveKind::Lines, target)
}

fn story(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|s| s.to_string()).collect()
}

/// All campaign levels in map order.
pub fn campaign() -> Vec<AdventureLevelConfig> {
    let mut levels = Vec::with_capacity(12);

    let mut first = level(1, "First Steps", lines(10), Vec::new(), 50);
    first.story.intro = story(&[
        "The quarry is quiet this morning.",
        "Stack the stones and clear ten rows to warm up.",
    ]);
    levels.push(first);

    let mut rush = Objective::new(ObjectiveKind::Score, 5000);
    rush.time_limit_ms = Some(180_000);
    levels.push(level(2, "Score Rush", rush, Vec::new(), 60));

    levels.push(level(
        3,
        "Gem Mine",
        Objective::new(ObjectiveKind::Gems, 6),
        vec![Gimmick::StartingGarbage(4), Gimmick::Gems(8)],
        80,
    ));

    levels.push(level(
        4,
        "Demolition",
        Objective::new(ObjectiveKind::Bombs, 4),
        vec![Gimmick::StartingGarbage(5), Gimmick::BombBlocks(6)],
        80,
    ));

    levels.push(level(5, "Four Wide", Objective::new(ObjectiveKind::Tetris, 2), Vec::new(), 90));

    let mut chain = level(6, "Chain Reaction", Objective::new(ObjectiveKind::Combo, 3), Vec::new(), 100);
    chain.story.intro = story(&["Clear rows back to back without missing a beat."]);
    levels.push(chain);

    let mut precision = Objective::new(ObjectiveKind::Moves, 8);
    precision.move_limit = Some(30);
    levels.push(level(7, "Precision", precision, Vec::new(), 110));

    levels.push(level(
        8,
        "Hold the Line",
        Objective::new(ObjectiveKind::TimeSurvival, 90),
        vec![Gimmick::RisingGarbage {
            interval_ms: 8_000,
            rows: 1,
        }],
        120,
    ));

    levels.push(level(9, "Upside Down", lines(15), vec![Gimmick::FlippedGravity], 130));

    levels.push(level(
        10,
        "Wild Cards",
        Objective::new(ObjectiveKind::Score, 8000),
        vec![Gimmick::Wildcards { every: 5 }, Gimmick::ExtendedShapes],
        140,
    ));

    let mut fast = level(11, "Fast Lane", lines(20), vec![Gimmick::SpeedBoost { percent: 150 }], 150);
    fast.start_level = 2;
    levels.push(fast);

    let mut golem = level(
        12,
        "The Stone Golem",
        Objective::new(ObjectiveKind::Boss, 0),
        vec![Gimmick::StartingGarbage(2)],
        300,
    );
    golem.boss = Some(BossConfig {
        name: "Stone Golem".into(),
        hp: 150,
        attack_interval_ms: 10_000,
        attack_rows: 2,
    });
    golem.story = StoryNodes {
        intro: story(&[
            "The ground shakes. Something old wakes below the quarry.",
            "Every row you clear chips at the golem.",
        ]),
        outro: story(&["The golem crumbles into gravel. The quarry is yours."]),
    };
    levels.push(golem);

    levels
}

/// Look up a campaign level by id.
pub fn level_by_id(id: u32) -> Option<AdventureLevelConfig> {
    campaign().into_iter().find(|l| l.id == id)
}
