mod feed;

pub use feed::HttpFeed;
