use rand::Rng;
use shared_game::{
    collision::collision::CollisionMask, config::config::GameConfig, state::state::GameState,
};
use shared_network::messages::ServerToClientMessage;

/// owns the authoritative game state of this process. terrain
/// generation is not the server core's job — it consumes a finished
/// mask, which for a bare process is an open field walled in at the
/// border.
pub struct ServerGame {
    pub game: GameState,
}

impl ServerGame {
    pub fn new(config: &GameConfig) -> Self {
        // the single authoritative world seed for this process
        let seed: u64 = rand::thread_rng().gen();
        log::info!("world seed {seed}");
        let collision = border_walled_mask(config);
        Self {
            game: GameState::new(config.clone(), collision, seed),
        }
    }

    /// the one-time handshake message with everything a client needs
    /// to reconstruct the world geometry
    pub fn world_init_msg(&self) -> ServerToClientMessage {
        let collision = &self.game.collision;
        ServerToClientMessage::WorldInit {
            seed: self.game.seed(),
            tile_size: collision.tile_size(),
            width: collision.width(),
            height: collision.height(),
            solid_tiles: collision.solid_tile_indices(),
        }
    }
}

fn border_walled_mask(config: &GameConfig) -> CollisionMask {
    let (w, h) = (config.world_width, config.world_height);
    let mut solid = Vec::new();
    for x in 0..w {
        solid.push((x, 0));
        solid.push((x, h - 1));
    }
    for y in 0..h {
        solid.push((0, y));
        solid.push((w - 1, y));
    }
    CollisionMask::from_solid_tiles(w, h, config.tile_size, &solid)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn border_is_solid_interior_is_open() {
        let config = GameConfig::default();
        let mask = border_walled_mask(&config);
        assert!(!mask.is_walkable(10.0, 10.0));
        assert!(!mask.is_walkable(mask.world_width_px() - 10.0, 500.0));
        assert!(mask.is_walkable(
            mask.world_width_px() / 2.0,
            mask.world_height_px() / 2.0
        ));
    }
}
