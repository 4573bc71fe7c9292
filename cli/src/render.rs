//! Plain-text rendering of catalog data.

use std::fmt;

use catalog_core::{Genre, KindRecord, Person, Title, TitleAggregate};

const NOT_AVAILABLE: &str = "not available";

fn or_na(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(NOT_AVAILABLE)
}

fn num_or_na(value: Option<u32>, unit: &str) -> String {
    value
        .filter(|v| *v > 0)
        .map(|v| format!("{v}{unit}"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn aggregate(aggregate: &TitleAggregate) -> String {
    Detail(aggregate).to_string()
}

/// Detail view of one aggregate.
struct Detail<'a>(&'a TitleAggregate);

impl fmt::Display for Detail<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let aggregate = self.0;
        let title = &aggregate.title;
        writeln!(f, "{}", title.name_title)?;
        writeln!(f, "Kind: {}", title.title_kind)?;
        writeln!(f, "{}", title.synopsis)?;
        writeln!(f, "Created: {}", or_na(title.date_created.as_deref()))?;
        writeln!(f, "Updated: {}", or_na(title.date_updated.as_deref()))?;

        match &aggregate.kind_record {
            Some(KindRecord::Work(work)) => {
                writeln!(f, "\nWork")?;
                writeln!(f, "  Original language: {}", or_na(Some(work.original_language.as_str())))?;
                writeln!(f, "  Original country: {}", or_na(Some(work.original_country.as_str())))?;
                writeln!(f, "  Original medium: {}", or_na(Some(work.original_medium.as_str())))?;
                writeln!(f, "  Created: {}", or_na(work.creation_date.as_deref()))?;
            }
            Some(KindRecord::Edition(edition)) => {
                writeln!(f, "\nEdition")?;
                writeln!(f, "  ISBN: {}", or_na(edition.isbn.as_deref()))?;
                writeln!(f, "  Publisher: {}", or_na(edition.publisher.as_deref()))?;
                writeln!(f, "  Pages: {}", num_or_na(edition.pages, ""))?;
                writeln!(f, "  Language: {}", or_na(edition.language.as_deref()))?;
            }
            Some(KindRecord::Adaptation(adaptation)) => {
                writeln!(f, "\nAdaptation")?;
                writeln!(f, "  Type: {}", or_na(adaptation.adaptation_type.as_deref()))?;
                writeln!(f, "  Released: {}", or_na(adaptation.date_released.as_deref()))?;
                writeln!(f, "  Producer: {}", or_na(adaptation.producer.as_deref()))?;
                writeln!(f, "  Duration: {}", num_or_na(adaptation.duration, " min"))?;
                writeln!(f, "  Language: {}", or_na(adaptation.language.as_deref()))?;
            }
            None => {}
        }

        writeln!(f, "\nGenres:")?;
        let genres = aggregate.genres_or_empty();
        if genres.is_empty() {
            writeln!(f, "  No genres associated.")?;
        }
        for genre in genres {
            let description = if genre.description.trim().is_empty() {
                "no description"
            } else {
                &genre.description
            };
            writeln!(f, "  - {}: {description}", genre.name)?;
        }

        writeln!(f, "\nCredits:")?;
        let credits = aggregate.credits_or_empty();
        if credits.is_empty() {
            writeln!(f, "  No credits associated.")?;
        }
        for credit in credits {
            writeln!(f, "  - {} - {}", credit.person_name, credit.role)?;
        }
        Ok(())
    }
}

pub fn titles(titles: &[&Title]) -> String {
    if titles.is_empty() {
        return "No titles found.\n".to_string();
    }
    titles
        .iter()
        .map(|t| format!("{:<36}  {:<10}  {}\n", t.id_title, t.title_kind, t.name_title))
        .collect()
}

pub fn genres(genres: &[Genre]) -> String {
    genres
        .iter()
        .map(|g| format!("{:>4}  {}: {}\n", g.id_genre, g.name, g.description))
        .collect()
}

pub fn persons(persons: &[Person]) -> String {
    persons
        .iter()
        .map(|p| format!("{:>4}  {} ({})\n", p.id_person, p.name, or_na(p.country.as_deref())))
        .collect()
}
