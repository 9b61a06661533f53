use crate::domain::lead::{City, PropertyType, Status, Timeline};
use crate::domain::query::LeadFilter;
use crate::templates::components::{labels, select};
use maud::{html, Markup};

pub fn filters_form(filter: &LeadFilter) -> Markup {
    let current = |v: Option<&'static str>| v.unwrap_or("");

    html! {
        form method="get" action="/buyers" class="filters" {
            input
                type="search"
                name="search"
                placeholder="Name, phone or email"
                value=(filter.search.as_deref().unwrap_or(""));

            (select("city", &labels(City::ALL, City::as_str), current(filter.city.map(City::as_str)), Some("All cities")))
            (select(
                "propertyType",
                &labels(PropertyType::ALL, PropertyType::as_str),
                current(filter.property_type.map(PropertyType::as_str)),
                Some("All property types"),
            ))
            (select("status", &labels(Status::ALL, Status::as_str), current(filter.status.map(Status::as_str)), Some("All statuses")))
            (select(
                "timeline",
                &labels(Timeline::ALL, Timeline::as_str),
                current(filter.timeline.map(Timeline::as_str)),
                Some("Any timeline"),
            ))

            button type="submit" { "Apply" }
            a href="/buyers" { "Clear" }
        }
    }
}
