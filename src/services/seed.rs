//! Demo data for local development (`--seed`).
//!
//! Everything goes through the services, so seeded data obeys the same
//! capacity and uniqueness rules as data created over the API.

use super::{
    attendee_service::AttendeeRegistry, booking_service::BookingAdmission,
    error::ServiceResult, event_service::EventCatalog,
};
use crate::models::{attendee::NewAttendee, event::NewEvent};
use chrono::{Duration, Utc};
use rand::{Rng, seq::SliceRandom};
use tracing::info;

const EVENT_TYPES: [&str; 10] = [
    "Conference", "Summit", "Workshop", "Seminar", "Expo", "Meetup", "Forum", "Bootcamp",
    "Symposium", "Webinar",
];
const TOPICS: [&str; 12] = [
    "Business", "Technology", "Marketing", "Leadership", "Innovation", "Digital", "Strategy",
    "Sales", "Finance", "Entrepreneurship", "Design", "Development",
];
const COUNTRIES: [&str; 10] = [
    "Norway", "Kenya", "Brazil", "Japan", "Canada", "Germany", "India", "Australia", "Mexico",
    "Portugal",
];
const FIRST_NAMES: [&str; 10] = [
    "Ada", "Bjorn", "Chiara", "Dan", "Esi", "Farah", "Goran", "Hana", "Ines", "Jonas",
];
const LAST_NAMES: [&str; 8] = [
    "Wrigley", "Okafor", "Lindqvist", "Tanaka", "Moreau", "Silva", "Novak", "Haddad",
];

pub const GENERATED_EVENTS: usize = 12;
pub const GENERATED_ATTENDEES: usize = 40;

/// Counts of what a seeding run created.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub events: usize,
    pub attendees: usize,
    pub bookings: usize,
}

pub struct Seeder {
    events: EventCatalog,
    attendees: AttendeeRegistry,
    bookings: BookingAdmission,
}

impl Seeder {
    pub fn new(events: EventCatalog, attendees: AttendeeRegistry, bookings: BookingAdmission) -> Self {
        Self {
            events,
            attendees,
            bookings,
        }
    }

    pub async fn run<R: Rng>(&self, rng: &mut R) -> ServiceResult<SeedSummary> {
        let mut summary = SeedSummary::default();

        let mut generated = Vec::with_capacity(GENERATED_EVENTS);
        for _ in 0..GENERATED_EVENTS {
            generated.push(self.events.create(random_event(rng)).await?);
        }
        summary.events += generated.len();

        // Addresses carry a batch tag so repeated runs do not collide.
        let batch = Utc::now().timestamp();
        let mut people = Vec::with_capacity(GENERATED_ATTENDEES);
        for n in 0..GENERATED_ATTENDEES {
            people.push(self.attendees.create(random_attendee(rng, batch, n)).await?.id);
        }
        summary.attendees += people.len();

        let conference = self
            .events
            .create(NewEvent {
                title: Some("Rust Conference 2026".into()),
                capacity: Some(20),
                ..random_event(rng)
            })
            .await?;
        let meetup = self
            .events
            .create(NewEvent {
                title: Some("Tech Meetup".into()),
                date: Some((Utc::now() + Duration::days(30)).to_rfc3339()),
                capacity: Some(50),
                ..random_event(rng)
            })
            .await?;
        summary.events += 2;

        // The first generated event stays empty.
        for event in generated.iter().skip(1) {
            let limit = (event.capacity as usize).min(people.len());
            let count = rng.gen_range(0..=limit);
            summary.bookings += self.book(event.id, &people, count, rng).await?;
        }

        summary.bookings += self.book(conference.id, &people, 20, rng).await?;
        summary.bookings += self.book(meetup.id, &people, 15, rng).await?;

        info!(
            events = summary.events,
            attendees = summary.attendees,
            bookings = summary.bookings,
            "database seeded"
        );
        Ok(summary)
    }

    async fn book<R: Rng>(
        &self,
        event_id: i64,
        people: &[i64],
        count: usize,
        rng: &mut R,
    ) -> ServiceResult<usize> {
        let chosen: Vec<i64> = people.choose_multiple(rng, count).copied().collect();
        for attendee_id in &chosen {
            self.bookings.attempt_booking(event_id, *attendee_id).await?;
        }
        Ok(chosen.len())
    }
}

fn random_event<R: Rng>(rng: &mut R) -> NewEvent {
    let kind = EVENT_TYPES.choose(rng).copied().unwrap_or("Conference");
    let topic = TOPICS.choose(rng).copied().unwrap_or("Technology");
    let year = rng.gen_range(2026..=2027);
    let title = match rng.gen_range(0..5) {
        0 => format!("{topic} {kind} {year}"),
        1 => format!("Annual {topic} {kind}"),
        2 => format!("{topic} Leadership {kind}"),
        3 => format!("International {topic} {kind}"),
        _ => format!("Global {topic} Summit"),
    };
    let date = Utc::now() + Duration::days(rng.gen_range(1..=365));

    NewEvent {
        title: Some(title),
        description: Some(format!("A {} on {} for practitioners.", kind.to_lowercase(), topic.to_lowercase())),
        date: Some(date.to_rfc3339()),
        country: COUNTRIES.choose(rng).map(|c| c.to_string()),
        capacity: Some(rng.gen_range(50..=500)),
    }
}

fn random_attendee<R: Rng>(rng: &mut R, batch: i64, n: usize) -> NewAttendee {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Ada");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Wrigley");
    NewAttendee {
        name: Some(format!("{first} {last}")),
        email: Some(format!(
            "{}.{}.{batch}.{n}@example.com",
            first.to_lowercase(),
            last.to_lowercase()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::pagination::PageRequest,
        services::{memory_store::MemoryStore, store::Store},
    };
    use rand::{SeedableRng, rngs::StdRng};
    use std::sync::Arc;

    #[tokio::test]
    async fn seeding_fills_scenario_events() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let seeder = Seeder::new(
            EventCatalog::new(store.clone()),
            AttendeeRegistry::new(store.clone()),
            BookingAdmission::new(store.clone()),
        );

        let summary = seeder.run(&mut StdRng::seed_from_u64(7)).await.unwrap();
        assert_eq!(summary.events, GENERATED_EVENTS + 2);
        assert_eq!(summary.attendees, GENERATED_ATTENDEES);

        let (events, total) = store
            .list_events(PageRequest { page: 1, per_page: 100 })
            .await
            .unwrap();
        assert_eq!(total as usize, GENERATED_EVENTS + 2);

        let first = &events[0];
        assert_eq!(store.count_bookings_for_event(first.id).await.unwrap(), 0);

        let conference = events
            .iter()
            .find(|e| e.title == "Rust Conference 2026")
            .unwrap();
        assert_eq!(store.count_bookings_for_event(conference.id).await.unwrap(), 20);

        let meetup = events.iter().find(|e| e.title == "Tech Meetup").unwrap();
        assert_eq!(store.count_bookings_for_event(meetup.id).await.unwrap(), 15);

        for event in &events {
            let held = store.count_bookings_for_event(event.id).await.unwrap();
            assert!(held <= event.capacity);
        }
    }
}
