//! Listing catalog ingestion.
//!
//! The engine treats the listing store as an external read dependency; this
//! module covers the two ways the binary hydrates one: a marketplace CSV
//! export and a built-in sample catalog for demos.

use super::domain::{ListingStatus, PropertyListing, PropertyType};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeSet;
use std::io::Read;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read listings csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Import outcome. Malformed rows are skipped and counted rather than
/// failing the whole batch.
#[derive(Debug)]
pub struct CatalogImport {
    pub listings: Vec<PropertyListing>,
    pub skipped: usize,
}

pub fn load_listings<R: Read>(reader: R) -> Result<CatalogImport, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut listings = Vec::new();
    let mut skipped = 0usize;

    for record in csv_reader.deserialize::<ListingRow>() {
        match record {
            Ok(row) => match row.into_listing() {
                Some(listing) => listings.push(listing),
                None => skipped += 1,
            },
            Err(_) => skipped += 1,
        }
    }

    Ok(CatalogImport { listings, skipped })
}

#[derive(Debug, Deserialize)]
struct ListingRow {
    id: String,
    property_type: String,
    #[serde(default)]
    bedrooms: Option<u8>,
    #[serde(default)]
    bathrooms: Option<f32>,
    #[serde(default)]
    square_footage: Option<u32>,
    city: String,
    state: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    amenities: Option<String>,
    #[serde(default)]
    monthly_rent: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default)]
    year_built: Option<u16>,
    #[serde(default)]
    view_count: Option<u32>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
}

impl ListingRow {
    fn into_listing(self) -> Option<PropertyListing> {
        if self.id.is_empty() || self.city.is_empty() || self.state.is_empty() {
            return None;
        }

        let amenities: BTreeSet<String> = self
            .amenities
            .as_deref()
            .map(|raw| {
                raw.split(['|', ';'])
                    .map(|tag| tag.trim().to_string())
                    .filter(|tag| !tag.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Some(PropertyListing {
            id: self.id,
            property_type: PropertyType::from_label(&self.property_type)
                .unwrap_or(PropertyType::Apartment),
            bedrooms: self.bedrooms.unwrap_or(0),
            bathrooms: self.bathrooms.unwrap_or(1.0),
            square_footage: self.square_footage,
            city: self.city,
            state: self.state,
            amenities,
            current_rent: self.monthly_rent,
            status: self
                .status
                .as_deref()
                .and_then(ListingStatus::from_label)
                .unwrap_or(ListingStatus::Active),
            year_built: self.year_built,
            view_count: self.view_count,
            created_at: self
                .created_at
                .as_deref()
                .and_then(parse_datetime)
                .map(|naive| naive.and_utc())
                .unwrap_or_else(Utc::now),
        })
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }

    None
}

/// Built-in catalog so the CLI and service work without external data.
pub fn sample_listings() -> Vec<PropertyListing> {
    fn entry(
        id: &str,
        property_type: PropertyType,
        bedrooms: u8,
        bathrooms: f32,
        square_footage: u32,
        city: &str,
        state: &str,
        amenities: &[&str],
        rent: Option<u32>,
        status: ListingStatus,
        year_built: u16,
        view_count: u32,
        created: &str,
    ) -> PropertyListing {
        PropertyListing {
            id: id.to_string(),
            property_type,
            bedrooms,
            bathrooms,
            square_footage: Some(square_footage),
            city: city.to_string(),
            state: state.to_string(),
            amenities: amenities.iter().map(|tag| tag.to_string()).collect(),
            current_rent: rent,
            status,
            year_built: Some(year_built),
            view_count: Some(view_count),
            created_at: parse_datetime(created)
                .map(|naive| naive.and_utc())
                .unwrap_or_else(Utc::now),
        }
    }

    vec![
        entry(
            "MUM-101",
            PropertyType::Apartment,
            2,
            2.0,
            950,
            "Mumbai",
            "Maharashtra",
            &["parking", "gym", "lift", "security"],
            Some(82_000),
            ListingStatus::Active,
            2019,
            240,
            "2026-06-02",
        ),
        entry(
            "MUM-102",
            PropertyType::Apartment,
            1,
            1.0,
            550,
            "Mumbai",
            "Maharashtra",
            &["lift", "security"],
            Some(48_000),
            ListingStatus::Active,
            2011,
            95,
            "2026-06-20",
        ),
        entry(
            "MUM-103",
            PropertyType::Condo,
            3,
            3.0,
            1_400,
            "Mumbai",
            "Maharashtra",
            &["parking", "gym", "pool", "clubhouse", "security", "lift"],
            Some(145_000),
            ListingStatus::Active,
            2022,
            410,
            "2026-07-12",
        ),
        entry(
            "MUM-104",
            PropertyType::Apartment,
            2,
            2.0,
            900,
            "Mumbai",
            "Maharashtra",
            &["parking", "balcony"],
            Some(76_000),
            ListingStatus::Rented,
            2016,
            530,
            "2026-05-18",
        ),
        entry(
            "MUM-105",
            PropertyType::Studio,
            0,
            1.0,
            420,
            "Mumbai",
            "Maharashtra",
            &["furnished", "wifi"],
            Some(38_000),
            ListingStatus::Active,
            2021,
            150,
            "2026-07-30",
        ),
        entry(
            "PUN-201",
            PropertyType::Apartment,
            2,
            2.0,
            1_050,
            "Pune",
            "Maharashtra",
            &["parking", "gym", "garden", "power backup", "security"],
            Some(34_000),
            ListingStatus::Active,
            2018,
            180,
            "2026-07-05",
        ),
        entry(
            "PUN-202",
            PropertyType::House,
            3,
            2.0,
            1_600,
            "Pune",
            "Maharashtra",
            &["parking", "garden"],
            Some(52_000),
            ListingStatus::Pending,
            2009,
            75,
            "2026-06-11",
        ),
        entry(
            "PUN-203",
            PropertyType::Apartment,
            1,
            1.0,
            600,
            "Pune",
            "Maharashtra",
            &["lift", "power backup"],
            Some(19_000),
            ListingStatus::Active,
            2015,
            60,
            "2026-08-01",
        ),
        entry(
            "BLR-301",
            PropertyType::Villa,
            4,
            4.0,
            2_400,
            "Bangalore",
            "Karnataka",
            &["parking", "garden", "gated community", "security", "pool"],
            Some(160_000),
            ListingStatus::Active,
            2020,
            320,
            "2026-07-22",
        ),
        entry(
            "BLR-302",
            PropertyType::Apartment,
            2,
            2.0,
            1_100,
            "Bangalore",
            "Karnataka",
            &["parking", "gym", "clubhouse"],
            Some(45_000),
            ListingStatus::Active,
            2017,
            140,
            "2026-08-10",
        ),
        // Newly listed, not yet priced; the calculator estimates at read time.
        entry(
            "JAI-401",
            PropertyType::Townhouse,
            3,
            2.0,
            1_300,
            "Jaipur",
            "Rajasthan",
            &["parking", "garden"],
            None,
            ListingStatus::Active,
            2014,
            20,
            "2026-08-18",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "id,property_type,bedrooms,bathrooms,square_footage,city,state,amenities,monthly_rent,status,year_built,view_count,created_at\n";

    #[test]
    fn parses_a_complete_row() {
        let csv = format!(
            "{HEADER}MUM-1,apartment,2,2,950,Mumbai,Maharashtra,parking|gym,82000,active,2019,240,2026-06-02\n"
        );
        let import = load_listings(csv.as_bytes()).expect("csv parses");

        assert_eq!(import.skipped, 0);
        assert_eq!(import.listings.len(), 1);
        let listing = &import.listings[0];
        assert_eq!(listing.property_type, PropertyType::Apartment);
        assert_eq!(listing.current_rent, Some(82_000));
        assert!(listing.amenities.contains("gym"));
        assert_eq!(listing.created_at.date_naive().to_string(), "2026-06-02");
    }

    #[test]
    fn blank_optionals_and_unknown_labels_degrade() {
        let csv = format!("{HEADER}PUN-9,treehouse,,,,Pune,Maharashtra,,,,,,\n");
        let import = load_listings(csv.as_bytes()).expect("csv parses");

        assert_eq!(import.listings.len(), 1);
        let listing = &import.listings[0];
        assert_eq!(listing.property_type, PropertyType::Apartment);
        assert_eq!(listing.bedrooms, 0);
        assert_eq!(listing.bathrooms, 1.0);
        assert_eq!(listing.status, ListingStatus::Active);
        assert_eq!(listing.current_rent, None);
    }

    #[test]
    fn bad_rows_are_skipped_not_fatal() {
        let csv = format!(
            "{HEADER},apartment,2,2,950,Mumbai,Maharashtra,,,,,,\nOK-1,apartment,2,2,950,Mumbai,Maharashtra,,,,,,\nBAD-2,apartment,lots,2,950,Mumbai,Maharashtra,,,,,,\n"
        );
        let import = load_listings(csv.as_bytes()).expect("csv parses");

        assert_eq!(import.listings.len(), 1);
        assert_eq!(import.listings[0].id, "OK-1");
        assert_eq!(import.skipped, 2);
    }

    #[test]
    fn sample_catalog_covers_multiple_markets() {
        let listings = sample_listings();
        assert!(listings.len() >= 10);
        assert!(listings
            .iter()
            .any(|listing| listing.city.eq_ignore_ascii_case("mumbai")));
        assert!(listings.iter().any(|listing| listing.current_rent.is_none()));
    }
}
