use std::marker::PhantomData;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::client::{ApiClient, ApiError};
use super::models::{Enquiry, PropertySummary, SiteVisit};
use super::pagination::{InfiniteQuery, Page, PageRequest, PageSource};
use super::transport::{BackendRequest, BackendTransport};
use crate::listing::fields::ListingType;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub city: Option<String>,
    pub listing_type: Option<ListingType>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub bedrooms: Option<u32>,
    pub text: Option<String>,
}

impl SearchFilters {
    fn apply(&self, mut request: BackendRequest) -> BackendRequest {
        if let Some(city) = non_blank(self.city.as_deref()) {
            request = request.with_query("city", city);
        }
        if let Some(listing_type) = self.listing_type {
            request = request.with_query("listingType", listing_type.as_str());
        }
        if let Some(min) = self.min_price {
            request = request.with_query("minPrice", min);
        }
        if let Some(max) = self.max_price {
            request = request.with_query("maxPrice", max);
        }
        if let Some(bedrooms) = self.bedrooms {
            request = request.with_query("bedrooms", bedrooms);
        }
        if let Some(text) = non_blank(self.text.as_deref()) {
            request = request.with_query("q", text);
        }
        request
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Cursor-paginated collections exposed by the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Favorites,
    Enquiries,
    Visits,
    OrganizationListings { organization_id: String },
    Search(SearchFilters),
}

impl Resource {
    pub fn path(&self) -> String {
        match self {
            Resource::Favorites => "/users/me/favorites".to_string(),
            Resource::Enquiries => "/users/me/enquiries".to_string(),
            Resource::Visits => "/users/me/visits".to_string(),
            Resource::OrganizationListings { organization_id } => {
                format!("/organizations/{organization_id}/properties")
            }
            Resource::Search(_) => "/properties/search".to_string(),
        }
    }

    pub fn request(&self, page: &PageRequest) -> BackendRequest {
        let mut request = BackendRequest::get(self.path()).with_query("limit", page.limit);
        if let Some(cursor) = &page.cursor {
            request = request.with_query("cursor", cursor);
        }
        match self {
            Resource::Search(filters) => filters.apply(request),
            _ => request,
        }
    }
}

/// One resource bound to a client, decoding its pages into `T`.
pub struct ResourcePages<T, Tr: ?Sized> {
    client: ApiClient<Tr>,
    resource: Resource,
    item: PhantomData<fn() -> T>,
}

impl<T, Tr: ?Sized> ResourcePages<T, Tr> {
    pub fn new(client: ApiClient<Tr>, resource: Resource) -> Self {
        Self {
            client,
            resource,
            item: PhantomData,
        }
    }

    pub fn resource(&self) -> &Resource {
        &self.resource
    }
}

#[async_trait]
impl<T, Tr> PageSource<T> for ResourcePages<T, Tr>
where
    T: DeserializeOwned + Send + 'static,
    Tr: BackendTransport + ?Sized + 'static,
{
    async fn fetch_page(&self, request: PageRequest) -> Result<Page<T>, ApiError> {
        let body = self.client.get_json(self.resource.request(&request)).await?;
        serde_json::from_value(body)
            .map_err(|err| ApiError::Decode(format!("{}: {err}", self.resource.path())))
    }
}

pub type ResourceQuery<T, Tr> = InfiniteQuery<T, ResourcePages<T, Tr>>;

impl<Tr> ApiClient<Tr>
where
    Tr: BackendTransport + ?Sized + 'static,
{
    pub fn favorites(&self) -> ResourceQuery<PropertySummary, Tr> {
        self.paginate(Resource::Favorites)
    }

    pub fn enquiries(&self) -> ResourceQuery<Enquiry, Tr> {
        self.paginate(Resource::Enquiries)
    }

    pub fn visits(&self) -> ResourceQuery<SiteVisit, Tr> {
        self.paginate(Resource::Visits)
    }

    pub fn organization_listings(
        &self,
        organization_id: impl Into<String>,
    ) -> ResourceQuery<PropertySummary, Tr> {
        self.paginate(Resource::OrganizationListings {
            organization_id: organization_id.into(),
        })
    }

    pub fn search(&self, filters: SearchFilters) -> ResourceQuery<PropertySummary, Tr> {
        self.paginate(Resource::Search(filters))
    }

    fn paginate<T>(&self, resource: Resource) -> ResourceQuery<T, Tr>
    where
        T: DeserializeOwned + Send + 'static,
    {
        InfiniteQuery::new(ResourcePages::new(self.clone(), resource))
    }
}
