//! Fund to benchmark registry loaded from CSV.
//!
//! Expected header: `Ticker,Benchmark Ticker,Name,New Benchmark Name`.
//! Additional columns are ignored.

use crate::types::FundListing;
use crate::{Error, Result};
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Read-only lookup of fund listings keyed by ticker.
#[derive(Debug, Clone)]
pub struct FundRegistry {
    /// Listings in file order
    listings: Vec<FundListing>,
    /// Upper-cased ticker -> index into `listings`
    index: HashMap<String, usize>,
}

impl FundRegistry {
    /// Build a registry from listings, rejecting empty input and duplicate tickers.
    pub fn from_listings(listings: Vec<FundListing>) -> Result<Self> {
        if listings.is_empty() {
            return Err(Error::Registry("registry has no funds".to_string()));
        }

        let mut index = HashMap::with_capacity(listings.len());
        for (i, listing) in listings.iter().enumerate() {
            if listing.ticker.is_empty() || listing.benchmark_ticker.is_empty() {
                return Err(Error::Registry(format!(
                    "row {} is missing a ticker or benchmark ticker",
                    i + 1
                )));
            }
            if index.insert(listing.ticker.clone(), i).is_some() {
                return Err(Error::Registry(format!(
                    "duplicate ticker: {}",
                    listing.ticker
                )));
            }
        }

        Ok(Self { listings, index })
    }

    /// Load a registry from a CSV file.
    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let registry = Self::from_reader(file)?;
        debug!(path = %path.display(), funds = registry.len(), "loaded fund registry");
        Ok(registry)
    }

    /// Parse a registry from any CSV reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut listings = Vec::new();
        for record in reader.deserialize::<FundListing>() {
            let row = record?;
            listings.push(FundListing::new(
                &row.ticker,
                &row.benchmark_ticker,
                &row.name,
                &row.benchmark_name,
            ));
        }

        Self::from_listings(listings)
    }

    /// Find a fund by ticker (case-insensitive).
    pub fn get(&self, ticker: &str) -> Option<&FundListing> {
        self.index
            .get(&ticker.trim().to_uppercase())
            .map(|&i| &self.listings[i])
    }

    /// Find a fund by ticker, or `Error::FundNotFound`.
    pub fn lookup(&self, ticker: &str) -> Result<&FundListing> {
        self.get(ticker)
            .ok_or_else(|| Error::FundNotFound(ticker.trim().to_uppercase()))
    }

    /// Fund tickers in file order.
    pub fn tickers(&self) -> Vec<&str> {
        self.listings.iter().map(|l| l.ticker.as_str()).collect()
    }

    /// All listings in file order.
    pub fn listings(&self) -> &[FundListing] {
        &self.listings
    }

    /// The default selection: the first listing.
    pub fn default_listing(&self) -> &FundListing {
        // Non-empty: checked in from_listings
        &self.listings[0]
    }

    /// Number of funds.
    pub fn len(&self) -> usize {
        self.listings.len()
    }

    /// Always false for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}
