mod duration;
mod state;
