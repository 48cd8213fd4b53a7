use super::*;

impl GameWorld {
    /// Canonical thread id for a pair of crews: their ids sorted and joined
    /// with a dash, so both sides address the same thread without a lookup.
    pub fn thread_id_for(crew_a: &str, crew_b: &str) -> String {
        if crew_a <= crew_b {
            format!("{crew_a}-{crew_b}")
        } else {
            format!("{crew_b}-{crew_a}")
        }
    }

    pub fn open_thread(&mut self, crew_a: &str, crew_b: &str) -> Result<String, ActionError> {
        for crew_id in [crew_a, crew_b] {
            if !self.crews.contains_key(crew_id) {
                return Err(ActionError::CrewNotFound(crew_id.to_string()));
            }
        }

        let thread_id = Self::thread_id_for(crew_a, crew_b);
        let turn = self.turn_number;
        self.chat_threads
            .entry(thread_id.clone())
            .or_insert_with(|| {
                let mut participants = vec![crew_a.to_string(), crew_b.to_string()];
                participants.sort();
                ChatThread {
                    id: thread_id.clone(),
                    participants,
                    messages: Vec::new(),
                    last_activity_turn: turn,
                }
            });
        Ok(thread_id)
    }

    /// Threads are created lazily on first message; the sender must be one
    /// of the two crews named by the thread id.
    pub fn send_chat_message(
        &mut self,
        sender_id: &str,
        thread_id: &str,
        content: &str,
    ) -> Result<(), ActionError> {
        let thread_id = if self.chat_threads.contains_key(thread_id) {
            thread_id.to_string()
        } else {
            let Some((left, right)) = thread_id.split_once('-') else {
                return Err(ActionError::ThreadNotFound(thread_id.to_string()));
            };
            let peer = if left == sender_id {
                right
            } else if right == sender_id {
                left
            } else {
                return Err(ActionError::NotAParticipant {
                    thread_id: thread_id.to_string(),
                    crew_id: sender_id.to_string(),
                });
            };
            self.open_thread(sender_id, peer)?
        };

        let message_id = self.rng.generate_id();
        let turn = self.turn_number;
        let thread = self
            .chat_threads
            .get_mut(&thread_id)
            .ok_or_else(|| ActionError::ThreadNotFound(thread_id.clone()))?;
        if !thread.participants.iter().any(|p| p == sender_id) {
            return Err(ActionError::NotAParticipant {
                thread_id: thread_id.clone(),
                crew_id: sender_id.to_string(),
            });
        }

        thread.messages.push(ChatMessage {
            id: message_id,
            sender_id: sender_id.to_string(),
            content: content.to_string(),
            sent_turn: turn,
            timestamp_ms: unix_millis(),
            is_read: false,
        });
        thread.last_activity_turn = turn;
        Ok(())
    }

    /// Marks everything the other side sent as read.
    pub fn mark_thread_read(&mut self, crew_id: &str, thread_id: &str) -> Result<(), ActionError> {
        let thread = self
            .chat_threads
            .get_mut(thread_id)
            .ok_or_else(|| ActionError::ThreadNotFound(thread_id.to_string()))?;
        if !thread.participants.iter().any(|p| p == crew_id) {
            return Err(ActionError::NotAParticipant {
                thread_id: thread_id.to_string(),
                crew_id: crew_id.to_string(),
            });
        }

        for message in thread.messages.iter_mut() {
            if message.sender_id != crew_id {
                message.is_read = true;
            }
        }
        Ok(())
    }
}
