use super::state::{Operation, Ticket};
use crate::errors::{AppError, AppResult};
use crate::gateway::TenderGateway;
use crate::models::{
    CpvCode, PopulateAck, Region, RegionSuggestions, ResultSet, TenderDetail, TenderSummary,
};

/// A backend call the wizard wants performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Search {
        ticket: Ticket,
        regions: Vec<Region>,
        limit: usize,
    },
    PopulateCpv {
        ticket: Ticket,
    },
    ListAvailableCpv {
        ticket: Ticket,
    },
    FilterByCpv {
        ticket: Ticket,
        codes: Vec<String>,
    },
    FetchDetail {
        ticket: Ticket,
        key: String,
        url: String,
        feed_origin: Option<String>,
    },
    SuggestRegions {
        ticket: Ticket,
        codes: Vec<String>,
    },
}

impl Request {
    pub fn ticket(&self) -> Ticket {
        match self {
            Self::Search { ticket, .. }
            | Self::PopulateCpv { ticket }
            | Self::ListAvailableCpv { ticket }
            | Self::FilterByCpv { ticket, .. }
            | Self::FetchDetail { ticket, .. }
            | Self::SuggestRegions { ticket, .. } => *ticket,
        }
    }

    pub fn operation(&self) -> Operation {
        self.ticket().operation
    }
}

/// The successful result of a [`Request`].
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Searched(ResultSet<TenderSummary>),
    Populated(PopulateAck),
    CpvsListed(Vec<CpvCode>),
    Filtered(ResultSet<TenderSummary>),
    DetailFetched(TenderDetail),
    RegionsSuggested(RegionSuggestions),
}

impl Outcome {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Searched(_) => Operation::Search,
            Self::Populated(_) => Operation::PopulateCpv,
            Self::CpvsListed(_) => Operation::ListAvailableCpv,
            Self::Filtered(_) => Operation::FilterByCpv,
            Self::DetailFetched(_) => Operation::FetchDetail,
            Self::RegionsSuggested(_) => Operation::SuggestRegions,
        }
    }
}

/// A finished request, ready to be fed back into the wizard.
#[derive(Debug)]
pub struct Completion {
    pub ticket: Ticket,
    pub result: AppResult<Outcome>,
}

impl Completion {
    pub fn success(ticket: Ticket, outcome: Outcome) -> Self {
        Self {
            ticket,
            result: Ok(outcome),
        }
    }

    pub fn failure(ticket: Ticket, error: AppError) -> Self {
        Self {
            ticket,
            result: Err(error),
        }
    }
}

/// Runs a request against the gateway.
///
/// Never fails itself: gateway errors are carried inside the [`Completion`].
pub async fn execute<G: TenderGateway>(gateway: &G, request: Request) -> Completion {
    let ticket = request.ticket();
    let result = match request {
        Request::Search { regions, limit, .. } => {
            gateway.search(&regions, limit).await.map(Outcome::Searched)
        }
        Request::PopulateCpv { .. } => gateway.populate_cpv().await.map(Outcome::Populated),
        Request::ListAvailableCpv { .. } => gateway
            .list_available_cpv()
            .await
            .map(Outcome::CpvsListed),
        Request::FilterByCpv { codes, .. } => {
            gateway.filter_by_cpv(&codes).await.map(Outcome::Filtered)
        }
        Request::FetchDetail {
            url, feed_origin, ..
        } => gateway
            .fetch_detail(&url, feed_origin.as_deref())
            .await
            .map(Outcome::DetailFetched),
        Request::SuggestRegions { codes, .. } => gateway
            .suggest_regions(&codes)
            .await
            .map(Outcome::RegionsSuggested),
    };
    Completion { ticket, result }
}
