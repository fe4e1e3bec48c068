/// A titled question with an owner. Ids are assigned by the database.
#[derive(Debug, Clone, PartialEq)]
pub struct Poll {
    pub id: i64,
    pub title: String,
    pub owner_username: String,
}

/// One selectable answer belonging to a poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOption {
    pub id: i64,
    pub option_text: String,
    pub poll_id: i64,
}

/// A cast ballot: who voted, and for which option. There is no
/// uniqueness constraint; the same username may vote repeatedly.
#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    pub username: String,
    pub option_id: i64,
}
