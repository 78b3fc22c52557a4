pub mod json_api;

pub use json_api::{
    roster_from_teams, simulate_slate_json, simulate_tennis_json, PlayerData, SlateRequest,
    SlateResponse, TeamData, TennisRequest, TennisResponse,
};
