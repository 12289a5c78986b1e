/*
 *  NitroVote - Discord bot tracking monthly Veil votes and Nitro rewards.
 *  Copyright (C) 2025  NitroVote contributors
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  You should have received a copy of the GNU General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */
use crate::clock::TimeWindow;
use crate::store::{StoreError, VoteEvent, VoteStore};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Number of paid winners when nothing else is configured.
pub const DEFAULT_WINNERS: usize = 3;

#[derive(Error, Debug)]
pub enum RankError {
    #[error("invalid window: start {start} is not before end {end}")]
    InvalidWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-voter totals for one window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user_id: u64,
    pub votes: u64,
    /// Earliest vote in the window.
    pub first_vote_at: DateTime<Utc>,
    /// Lowest event id among the votes cast at `first_vote_at`.
    pub first_vote_id: i64,
    /// Latest vote in the window, i.e. when the voter reached their total.
    pub last_vote_at: DateTime<Utc>,
    /// Highest event id among the votes cast at `last_vote_at`.
    pub last_vote_id: i64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WinnerEntry {
    /// 1-based podium position.
    pub place: usize,
    pub user_id: u64,
    pub votes: u64,
    pub last_vote_at: DateTime<Utc>,
}

impl LeaderboardEntry {
    fn open(event: &VoteEvent) -> LeaderboardEntry {
        Self {
            user_id: event.user_id,
            votes: 1,
            first_vote_at: event.voted_at,
            first_vote_id: event.id,
            last_vote_at: event.voted_at,
            last_vote_id: event.id,
        }
    }

    fn absorb(&mut self, event: &VoteEvent) {
        self.votes += 1;
        match event.voted_at.cmp(&self.first_vote_at) {
            Ordering::Less => {
                self.first_vote_at = event.voted_at;
                self.first_vote_id = event.id;
            }
            Ordering::Equal => self.first_vote_id = self.first_vote_id.min(event.id),
            Ordering::Greater => {}
        }
        match event.voted_at.cmp(&self.last_vote_at) {
            Ordering::Greater => {
                self.last_vote_at = event.voted_at;
                self.last_vote_id = event.id;
            }
            Ordering::Equal => self.last_vote_id = self.last_vote_id.max(event.id),
            Ordering::Less => {}
        }
    }
}

/**
 * Groups the events of `window` by voter.
 *
 * The events must come from one snapshot of the store: a repeated event id or an event outside
 * the window means the store broke its contract, and is reported instead of being ranked.
 */
pub fn aggregate(
    window: &TimeWindow,
    events: &[VoteEvent],
) -> Result<Vec<LeaderboardEntry>, StoreError> {
    let mut seen = HashSet::with_capacity(events.len());
    let mut voters: HashMap<u64, LeaderboardEntry> = HashMap::new();

    for event in events {
        if !window.contains(event.voted_at) {
            return Err(StoreError::Inconsistent(format!(
                "vote {} at {} lies outside {}",
                event.id, event.voted_at, window
            )));
        }
        if !seen.insert(event.id) {
            return Err(StoreError::Inconsistent(format!(
                "vote {} was returned twice",
                event.id
            )));
        }

        match voters.entry(event.user_id) {
            Entry::Occupied(mut entry) => entry.get_mut().absorb(event),
            Entry::Vacant(entry) => {
                entry.insert(LeaderboardEntry::open(event));
            }
        }
    }

    Ok(voters.into_values().collect())
}

/// Leaderboard order: more votes, then earlier first vote, then lower first event id, then lower
/// user id.
pub fn leaderboard_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.votes
        .cmp(&a.votes)
        .then_with(|| a.first_vote_at.cmp(&b.first_vote_at))
        .then_with(|| a.first_vote_id.cmp(&b.first_vote_id))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// Payout order: more votes, then whoever reached that total first. Earliest start is irrelevant
/// here.
pub fn payout_order(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.votes
        .cmp(&a.votes)
        .then_with(|| a.last_vote_at.cmp(&b.last_vote_at))
        .then_with(|| a.last_vote_id.cmp(&b.last_vote_id))
        .then_with(|| a.user_id.cmp(&b.user_id))
}

pub fn rank_leaderboard(mut entries: Vec<LeaderboardEntry>, n: usize) -> Vec<LeaderboardEntry> {
    entries.sort_unstable_by(leaderboard_order);
    entries.truncate(n);
    entries
}

/**
 * Picks at most `k` winners among the voters with at least `min_votes` votes.
 *
 * Ineligible voters are dropped before ranking, so they can never take a podium place.
 */
pub fn select_winners(
    entries: Vec<LeaderboardEntry>,
    min_votes: u64,
    k: usize,
) -> Vec<WinnerEntry> {
    let mut eligible: Vec<_> = entries
        .into_iter()
        .filter(|entry| entry.votes >= min_votes)
        .collect();
    eligible.sort_unstable_by(payout_order);

    eligible
        .into_iter()
        .take(k)
        .enumerate()
        .map(|(i, entry)| WinnerEntry {
            place: i + 1,
            user_id: entry.user_id,
            votes: entry.votes,
            last_vote_at: entry.last_vote_at,
        })
        .collect()
}

/**
 * Ranking engine over a vote store.
 *
 * Every call performs one bounded store read and ranks the returned snapshot. Store failures are
 * passed through untouched; an empty result only ever means nobody voted.
 */
#[derive(Clone)]
pub struct VoteBoard {
    store: Arc<dyn VoteStore>,
    read_timeout: Duration,
}

impl VoteBoard {
    pub fn new(store: Arc<dyn VoteStore>, read_timeout: Duration) -> VoteBoard {
        Self {
            store,
            read_timeout,
        }
    }

    /// Votes cast by `user_id` within `window`.
    pub async fn votes_for(&self, user_id: u64, window: &TimeWindow) -> Result<u64, RankError> {
        let votes = timeout(self.read_timeout, self.store.count_in_window(user_id, window))
            .await
            .map_err(|_| StoreError::Timeout(self.read_timeout))??;
        Ok(votes)
    }

    pub async fn top_n(
        &self,
        window: &TimeWindow,
        n: usize,
    ) -> Result<Vec<LeaderboardEntry>, RankError> {
        let entries = self.tally(window).await?;
        Ok(rank_leaderboard(entries, n))
    }

    pub async fn winners(
        &self,
        window: &TimeWindow,
        min_votes: u64,
        k: usize,
    ) -> Result<Vec<WinnerEntry>, RankError> {
        let entries = self.tally(window).await?;
        Ok(select_winners(entries, min_votes, k))
    }

    async fn tally(&self, window: &TimeWindow) -> Result<Vec<LeaderboardEntry>, RankError> {
        let events = timeout(self.read_timeout, self.store.events_in_window(window))
            .await
            .map_err(|_| StoreError::Timeout(self.read_timeout))??;
        tracing::debug!(%window, events = events.len(), "read vote snapshot");
        Ok(aggregate(window, &events)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeDelta, TimeZone};

    struct MemoryStore {
        events: Vec<VoteEvent>,
    }

    #[async_trait]
    impl VoteStore for MemoryStore {
        async fn events_in_window(
            &self,
            window: &TimeWindow,
        ) -> Result<Vec<VoteEvent>, StoreError> {
            Ok(self
                .events
                .iter()
                .filter(|event| window.contains(event.voted_at))
                .cloned()
                .collect())
        }

        async fn count_in_window(
            &self,
            user_id: u64,
            window: &TimeWindow,
        ) -> Result<u64, StoreError> {
            Ok(self
                .events
                .iter()
                .filter(|event| event.user_id == user_id && window.contains(event.voted_at))
                .count() as u64)
        }
    }

    struct BrokenStore;

    #[async_trait]
    impl VoteStore for BrokenStore {
        async fn events_in_window(&self, _: &TimeWindow) -> Result<Vec<VoteEvent>, StoreError> {
            Err(StoreError::Unavailable(sqlx::Error::PoolTimedOut))
        }

        async fn count_in_window(&self, _: u64, _: &TimeWindow) -> Result<u64, StoreError> {
            Err(StoreError::Unavailable(sqlx::Error::PoolClosed))
        }
    }

    struct StalledStore;

    #[async_trait]
    impl VoteStore for StalledStore {
        async fn events_in_window(&self, _: &TimeWindow) -> Result<Vec<VoteEvent>, StoreError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Vec::new())
        }

        async fn count_in_window(&self, _: u64, _: &TimeWindow) -> Result<u64, StoreError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(0)
        }
    }

    fn may() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2025, 5, 1, 5, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 1, 5, 0, 0).unwrap(),
        )
        .unwrap()
    }

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, d, 12, 0, 0).unwrap()
    }

    fn vote(id: i64, user_id: u64, voted_at: DateTime<Utc>) -> VoteEvent {
        VoteEvent {
            id,
            user_id,
            voted_at,
        }
    }

    fn board(events: Vec<VoteEvent>) -> VoteBoard {
        VoteBoard::new(Arc::new(MemoryStore { events }), Duration::from_secs(5))
    }

    /// `count` votes for `user_id`, twelve hours apart, starting at `first`.
    fn streak(
        next_id: &mut i64,
        user_id: u64,
        first: DateTime<Utc>,
        count: i64,
    ) -> Vec<VoteEvent> {
        (0..count)
            .map(|i| {
                *next_id += 1;
                vote(*next_id, user_id, first + TimeDelta::hours(12 * i))
            })
            .collect()
    }

    #[test]
    fn aggregate_tracks_first_and_last_votes() {
        let events = vec![
            vote(7, 1, day(9)),
            vote(3, 1, day(2)),
            vote(4, 1, day(2)),
            vote(9, 1, day(9)),
            vote(5, 2, day(4)),
        ];

        let mut entries = aggregate(&may(), &events).unwrap();
        entries.sort_by_key(|entry| entry.user_id);

        assert_eq!(
            entries[0],
            LeaderboardEntry {
                user_id: 1,
                votes: 4,
                first_vote_at: day(2),
                first_vote_id: 3,
                last_vote_at: day(9),
                last_vote_id: 9,
            }
        );
        assert_eq!(entries[1].votes, 1);
    }

    #[test]
    fn aggregate_rejects_duplicated_events() {
        let events = vec![vote(1, 1, day(2)), vote(1, 1, day(2))];
        assert!(matches!(
            aggregate(&may(), &events),
            Err(StoreError::Inconsistent(_))
        ));
    }

    #[test]
    fn aggregate_rejects_events_outside_the_window() {
        let window = may();
        let events = vec![vote(1, 1, day(2)), vote(2, 1, window.end())];
        assert!(matches!(
            aggregate(&window, &events),
            Err(StoreError::Inconsistent(_))
        ));
    }

    #[tokio::test]
    async fn window_edges_are_half_open() {
        let window = may();
        let board = board(vec![
            vote(1, 1, window.start() - TimeDelta::microseconds(1)),
            vote(2, 1, window.start()),
            vote(3, 1, window.end() - TimeDelta::microseconds(1)),
            vote(4, 1, window.end()),
        ]);

        assert_eq!(board.votes_for(1, &window).await.unwrap(), 2);
        assert_eq!(board.top_n(&window, 10).await.unwrap()[0].votes, 2);
    }

    #[tokio::test]
    async fn top_n_is_a_strict_total_order_and_idempotent() {
        let at = day(3);
        // Same count and same first instant for everybody: only ids can separate them.
        let board = board(vec![
            vote(10, 30, at),
            vote(11, 20, at),
            vote(12, 10, at),
            vote(13, 40, at),
            vote(14, 40, day(4)),
        ]);
        let window = may();

        let first = board.top_n(&window, 10).await.unwrap();
        let second = board.top_n(&window, 10).await.unwrap();

        assert_eq!(first, second);
        let order: Vec<u64> = first.iter().map(|entry| entry.user_id).collect();
        assert_eq!(order, vec![40, 30, 20, 10]);
        for pair in first.windows(2) {
            assert_eq!(leaderboard_order(&pair[0], &pair[1]), Ordering::Less);
        }
    }

    #[tokio::test]
    async fn top_n_truncates() {
        let mut id = 0;
        let mut events = Vec::new();
        for user in 1..=15u64 {
            events.extend(streak(&mut id, user, day(1), user as i64));
        }
        let board = board(events);

        let top = board.top_n(&may(), 10).await.unwrap();

        assert_eq!(top.len(), 10);
        assert_eq!(top[0].user_id, 15);
        assert_eq!(top[9].user_id, 6);
    }

    #[tokio::test]
    async fn leaderboard_and_payout_break_ties_differently() {
        const A: u64 = 100;
        const B: u64 = 200;
        // A started first, B reached the shared total first.
        let board = board(vec![
            vote(1, A, day(1)),
            vote(2, B, day(5)),
            vote(3, B, day(6)),
            vote(4, A, day(20)),
        ]);
        let window = may();

        let top = board.top_n(&window, 10).await.unwrap();
        let winners = board.winners(&window, 1, DEFAULT_WINNERS).await.unwrap();

        assert_eq!(top.iter().map(|e| e.user_id).collect::<Vec<_>>(), vec![A, B]);
        assert_eq!(
            winners.iter().map(|w| w.user_id).collect::<Vec<_>>(),
            vec![B, A]
        );
    }

    #[tokio::test]
    async fn winners_ignore_voters_below_the_threshold() {
        let mut id = 0;
        let mut events = streak(&mut id, 1, day(1), 31);
        events.extend(streak(&mut id, 2, day(1), 29));
        events.extend(streak(&mut id, 3, day(2), 30));
        let board = board(events);

        let winners = board.winners(&may(), 30, 3).await.unwrap();

        assert_eq!(winners.len(), 2);
        assert_eq!(winners[0].user_id, 1);
        assert_eq!(winners[0].place, 1);
        assert_eq!(winners[1].user_id, 3);
        assert_eq!(winners[1].place, 2);
        assert!(winners.iter().all(|w| w.votes >= 30));
    }

    #[tokio::test]
    async fn microsecond_tie_goes_to_the_lower_event_id() {
        let mut id = 0;
        let mut events = streak(&mut id, 7, day(1), 40);
        let mut second = streak(&mut id, 8, day(1), 34);
        let mut third = streak(&mut id, 9, day(1), 34);
        let finish = day(30) + TimeDelta::microseconds(250);
        // User 9's final vote is inserted before user 8's at the very same instant.
        third.push(vote(1_000, 9, finish));
        second.push(vote(1_001, 8, finish));
        events.append(&mut second);
        events.append(&mut third);
        let board = board(events);

        let winners = board.winners(&may(), 30, 3).await.unwrap();

        let podium: Vec<(u64, u64)> = winners.iter().map(|w| (w.user_id, w.votes)).collect();
        assert_eq!(podium, vec![(7, 40), (9, 35), (8, 35)]);
    }

    #[tokio::test]
    async fn empty_window_is_not_an_error() {
        let board = board(vec![vote(1, 1, day(2) - TimeDelta::days(40))]);
        let window = may();

        assert!(board.top_n(&window, 10).await.unwrap().is_empty());
        assert!(board.winners(&window, 30, 3).await.unwrap().is_empty());
        assert_eq!(board.votes_for(1, &window).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn store_failures_are_not_reported_as_empty() {
        let board = VoteBoard::new(Arc::new(BrokenStore), Duration::from_secs(5));
        let window = may();

        assert!(matches!(
            board.top_n(&window, 10).await,
            Err(RankError::Store(StoreError::Unavailable(_)))
        ));
        assert!(matches!(
            board.winners(&window, 30, 3).await,
            Err(RankError::Store(StoreError::Unavailable(_)))
        ));
        assert!(matches!(
            board.votes_for(1, &window).await,
            Err(RankError::Store(StoreError::Unavailable(_)))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_store_times_out() {
        let board = VoteBoard::new(Arc::new(StalledStore), Duration::from_secs(10));

        let err = board.winners(&may(), 30, 3).await.unwrap_err();

        assert!(matches!(
            err,
            RankError::Store(StoreError::Timeout(limit)) if limit == Duration::from_secs(10)
        ));
    }
}
