//! Headless — run a small level for a few simulated seconds and report.
//!
//! Player 1 walks right over a coin, drops a bomb and backs off; the
//! enemies wander.
//! Nothing is drawn: the point is the log output and the final summary.
//!
//! Run with: `RUST_LOG=info cargo run -p blastgrid --example headless`

use std::time::Duration;

use blastgrid::boss::bosses_left;
use blastgrid::entities::{coins_left, find_player};
use blastgrid::prelude::*;

const LEVEL: &str = "
    ###########
    #XC.+..+.a#
    #.#.#+#.#.#
    #..T...+.A#
    #.#.#.#.#.#
    #b...+..T.#
    ###########
";

const LEVEL_SET: &str = r#"{
    "name": "headless",
    "enemies": {
        "1": { "ai": "random_forward", "value": 100 },
        "2": { "ai": "follow", "speed": 1.2, "value": 200 }
    }
}"#;

const FRAME: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    env_logger::init();

    let grid = TileGrid::from_text(LEVEL)?;
    let levelset = LevelSetInfo::from_json_str(LEVEL_SET)?;
    let mut world = World::new(SimConfig::default());
    let summary = LevelLoader::new(levelset).load(&mut world, &grid)?;
    println!("{summary:?}");

    let Some(p1) = find_player(&world, 1) else {
        return Err(SimError::InvalidParameter("level has no player 1".to_owned()));
    };

    let mut sounds = 0usize;
    for frame in 0..600u32 {
        if let Some(control) = world.entities.get_mut::<PlayerControl>(p1) {
            match frame {
                0..=20 => control.direction = Direction::Right,
                21 => {
                    control.direction = Direction::None;
                    control.drop_bomb = true;
                }
                22..=60 => control.direction = Direction::Left,
                _ => control.direction = Direction::None,
            }
        }
        world.update(FRAME);
        for name in world.ctx.assets.drain_sounds() {
            log::debug!("frame {frame}: sound {name}");
            sounds += 1;
        }
    }

    let enemies = world.entities.iter::<Enemy>().count();
    println!(
        "after {:.1}s: {} enemies, {} bosses, {} coins, {} entities, {} sounds",
        world.time.elapsed().as_secs_f32(),
        enemies,
        bosses_left(&world),
        coins_left(&world),
        world.entities.len(),
        sounds
    );
    for (_, player) in world.entities.iter::<Player>() {
        println!(
            "player {}: score {}, lives {}",
            player.id(),
            player.score(),
            player.lives()
        );
    }

    #[cfg(feature = "diagnostics")]
    {
        if let Some(schedule) = world.schedule() {
            for t in schedule.timings() {
                println!("{:>20}  {:8.1} us", t.name, t.duration_us);
            }
        }
    }

    Ok(())
}
