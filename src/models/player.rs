use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum Player {
    #[strum(serialize = "Player One")]
    One,
    #[strum(serialize = "Player Two")]
    Two,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::One, Player::Two];

    pub fn other(self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    pub fn index(self) -> usize {
        self.number() as usize - 1
    }

    /// Accepts `1`/`2` or `one`/`two`, case-insensitively.
    pub fn parse(s: &str) -> Option<Player> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "one" | "p1" => Some(Player::One),
            "2" | "two" | "p2" => Some(Player::Two),
            _ => None,
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Player {
        if rng.gen_bool(0.5) {
            Player::One
        } else {
            Player::Two
        }
    }
}
