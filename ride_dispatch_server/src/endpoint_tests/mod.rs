mod app;
mod chair;
mod helpers;
