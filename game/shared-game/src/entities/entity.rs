pub mod entity {
    use game_interface::types::game::GameEntityId;

    #[derive(Debug, PartialEq, Eq)]
    pub enum EntityTickResult {
        None,
        RemoveEntity,
    }

    /// the part every world entity shares
    #[derive(Debug)]
    pub struct Entity {
        pub id: GameEntityId,
    }

    impl Entity {
        pub fn new(id: GameEntityId) -> Self {
            Self { id }
        }
    }
}
