mod helpers;

mod roundtrip_tests;
