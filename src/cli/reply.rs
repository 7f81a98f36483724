use crate::display::split_message;

pub struct Reply {
    messages: Vec<String>,
}

impl Reply {
    pub fn new() -> Self {
        Reply {
            messages: Vec::new(),
        }
    }

    pub fn add(&mut self, msg: impl Into<String>) {
        self.messages.push(msg.into());
    }

    pub fn add_boxed(&mut self, msg: impl AsRef<str>) {
        self.messages.push(format!("```\n{}\n```", msg.as_ref()));
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn to_string(&self) -> String {
        self.messages.join("\n")
    }

    /// The reply cut into messages no longer than `limit`.
    pub fn chunks(&self, limit: usize) -> Vec<String> {
        split_message(&self.to_string(), limit)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_reply_joins_messages() {
        let mut reply = Reply::new();
        assert!(reply.is_empty());

        reply.add("Current player: Player One");
        reply.add_boxed("1 Island");
        assert_eq!(
            reply.to_string(),
            "Current player: Player One\n```\n1 Island\n```"
        );
    }

    #[test]
    fn test_reply_chunks() {
        let mut reply = Reply::new();
        reply.add("first line");
        reply.add("second line");
        assert_eq!(reply.chunks(12), vec!["first line\n", "second line\n"]);
    }
}
